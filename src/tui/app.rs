use ratatui::widgets::ListState;

use crate::app::OpenedArticle;
use crate::content::to_plain_text;
use crate::domain::SavedArticle;
use crate::feed::FeedSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Feed,
    Detail,
    Saved,
}

pub const PAGE_SIZE: usize = 10;

/// One rendered section of the detail view.
#[derive(Debug, Clone)]
pub struct DetailBlock {
    pub heading: String,
    pub level: u8,
    pub body: String,
}

pub struct DetailState {
    pub opened: OpenedArticle,
    pub blocks: Vec<DetailBlock>,
    pub scroll: u16,
}

impl DetailState {
    pub fn new(opened: OpenedArticle) -> Self {
        let blocks = opened
            .article
            .sections
            .iter()
            .map(|section| DetailBlock {
                heading: section.title.clone(),
                level: section.level,
                body: to_plain_text(&section.content),
            })
            .collect();

        Self {
            opened,
            blocks,
            scroll: 0,
        }
    }
}

pub struct TuiApp {
    pub view: View,
    /// Where `back` leaves the detail view for.
    pub return_view: View,
    pub feed: FeedSnapshot,
    pub detail: Option<DetailState>,
    pub saved: Vec<SavedArticle>,
    pub saved_index: usize,
    pub saved_list_state: ListState,
    pub search_query: String,
    pub searching: bool,
    // Pending remove confirmation (id, title)
    pub pending_remove: Option<(String, String)>,
    /// Live drag displacement in gesture units.
    pub drag_offset: Option<(f64, f64)>,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl TuiApp {
    pub fn new(feed: FeedSnapshot) -> Self {
        let mut saved_list_state = ListState::default();
        saved_list_state.select(Some(0));

        Self {
            view: View::Feed,
            return_view: View::Feed,
            feed,
            detail: None,
            saved: Vec::new(),
            saved_index: 0,
            saved_list_state,
            search_query: String::new(),
            searching: false,
            pending_remove: None,
            drag_offset: None,
            should_quit: false,
            status_message: None,
        }
    }

    pub fn selected_saved(&self) -> Option<&SavedArticle> {
        self.saved.get(self.saved_index)
    }

    pub fn set_saved(&mut self, saved: Vec<SavedArticle>) {
        self.saved = saved;
        if self.saved_index >= self.saved.len() {
            self.saved_index = self.saved.len().saturating_sub(1);
        }
        self.saved_list_state.select(Some(self.saved_index));
    }

    pub fn open_detail(&mut self, opened: OpenedArticle) {
        if self.view != View::Detail {
            self.return_view = self.view;
        }
        self.detail = Some(DetailState::new(opened));
        self.view = View::Detail;
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
        self.view = self.return_view;
    }

    pub fn move_up(&mut self, by: usize) {
        match self.view {
            View::Saved => {
                self.saved_index = self.saved_index.saturating_sub(by);
                self.saved_list_state.select(Some(self.saved_index));
            }
            View::Detail => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.scroll = detail.scroll.saturating_sub(by as u16);
                }
            }
            View::Feed => {}
        }
    }

    pub fn move_down(&mut self, by: usize) {
        match self.view {
            View::Saved => {
                let max_index = self.saved.len().saturating_sub(1);
                self.saved_index = (self.saved_index + by).min(max_index);
                self.saved_list_state.select(Some(self.saved_index));
            }
            View::Detail => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.scroll = detail.scroll.saturating_add(by as u16);
                }
            }
            View::Feed => {}
        }
    }

    pub fn set_status(&mut self, message: String) {
        self.status_message = Some(message);
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }
}
