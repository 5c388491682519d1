use crate::app::{AppContext, Result, SwipediaError};
use crate::content::to_plain_text;
use crate::domain::title::title_from_input;
use crate::domain::{ArticleSummary, PreferencesUpdate, Theme};
use crate::fetcher::parallel::ParallelFetcher;

pub async fn random(ctx: &AppContext, count: usize, workers: usize) -> Result<()> {
    let fetcher = ParallelFetcher::with_workers(ctx.source.clone(), workers);
    let batch = fetcher.fetch_random_batch(count).await;

    if batch.articles.is_empty() {
        if let Some(e) = batch.errors.into_iter().next() {
            return Err(e);
        }
        println!("No articles");
        return Ok(());
    }

    for article in &batch.articles {
        print_summary(article);
        println!();
    }

    if !batch.errors.is_empty() {
        println!("({} of {} requests failed)", batch.errors.len(), count);
    }

    Ok(())
}

pub async fn show(ctx: &AppContext, title: &str) -> Result<()> {
    let opened = ctx.open_article(&title_from_input(title)).await?;
    let article = &opened.article;

    println!("{}", article.title());
    println!("{}", article.summary.page_url);
    if opened.offline {
        println!("(offline copy)");
    }
    if opened.saved {
        println!("★ saved");
    }

    for section in &article.sections {
        println!();
        println!("{} {}", "#".repeat(usize::from(section.level.max(1))), section.title);
        println!();
        println!("{}", to_plain_text(&section.content));
    }

    if !article.related.is_empty() {
        println!();
        println!("Related:");
        for (i, related) in article.related.iter().enumerate() {
            println!("  {}. {}", i + 1, related.title);
        }
    }

    if opened.saved {
        ctx.library.mark_viewed(article.id()).await?;
    }

    Ok(())
}

pub async fn save(ctx: &AppContext, title: &str) -> Result<()> {
    let opened = ctx.open_article(&title_from_input(title)).await?;
    if opened.offline {
        println!("Already saved: {}", opened.article.title());
        return Ok(());
    }

    let saved = ctx.library.save_full(&opened.article).await?;
    println!("Saved: {} [{}]", saved.title(), saved.id());
    Ok(())
}

pub async fn unsave(ctx: &AppContext, id: &str) -> Result<()> {
    let saved = ctx
        .library
        .get(id)
        .await?
        .ok_or_else(|| SwipediaError::NotFound(format!("saved article {}", id)))?;

    ctx.library.unsave(id).await?;
    println!("Removed: {}", saved.title());
    Ok(())
}

pub async fn list_saved(ctx: &AppContext, search: Option<&str>) -> Result<()> {
    let saved = match search {
        Some(query) => ctx.library.search(query).await?,
        None => ctx.library.list_saved().await?,
    };

    if saved.is_empty() {
        println!("No saved articles");
        return Ok(());
    }

    println!("{:<10} {:<10} {:<8} Title", "ID", "Saved", "Offline");
    println!("{}", "-".repeat(60));

    for article in &saved {
        let offline = if article.offline_content.is_some() {
            "yes"
        } else {
            "no"
        };
        println!(
            "{:<10} {:<10} {:<8} {}",
            article.id(),
            article.saved_at.format("%Y-%m-%d"),
            offline,
            article.title()
        );
    }

    Ok(())
}

pub async fn prefs(ctx: &AppContext, theme: Option<Theme>, haptics: Option<bool>) -> Result<()> {
    let prefs = if theme.is_some() || haptics.is_some() {
        let update = PreferencesUpdate {
            theme,
            haptics,
            ..Default::default()
        };
        ctx.library.update_preferences(update).await?
    } else {
        ctx.library.preferences().await?
    };

    println!("theme:   {}", prefs.theme);
    println!("haptics: {}", prefs.haptics);
    println!("liked:   {}", prefs.liked_ids.len());
    println!("skipped: {}", prefs.skipped_ids.len());
    Ok(())
}

fn print_summary(article: &ArticleSummary) {
    println!("{} [{}]", article.title, article.id);
    println!("  {}", article.display_extract());
    println!("  {}", article.page_url);
}
