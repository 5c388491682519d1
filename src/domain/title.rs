//! Conversions between display titles and their route / URL forms.

/// Form used in upstream URL paths: spaces become underscores.
pub fn to_path_form(title: &str) -> String {
    title.trim().replace(' ', "_")
}

/// Percent-encoded route segment, as carried by `/article/<title>` links.
pub fn encode_route(title: &str) -> String {
    urlencoding::encode(&to_path_form(title)).into_owned()
}

/// Decode a route segment back into a display title.
///
/// Undecodable input is kept verbatim rather than rejected.
pub fn decode_route(segment: &str) -> String {
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    decoded.replace('_', " ").trim().to_string()
}

/// Title from user input that may be a display title, an `/article/<segment>`
/// route or a `/wiki/<segment>` page URL.
pub fn title_from_input(input: &str) -> String {
    let input = input.trim();
    let segment = input
        .strip_prefix("/article/")
        .or_else(|| input.split_once("/wiki/").map(|(_, rest)| rest))
        .unwrap_or(input);
    let segment = segment.split(['#', '?']).next().unwrap_or(segment);
    decode_route(segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_form() {
        assert_eq!(to_path_form("Albert Einstein"), "Albert_Einstein");
    }

    #[test]
    fn test_encode_route_escapes_reserved() {
        assert_eq!(encode_route("AC/DC"), "AC%2FDC");
        assert_eq!(encode_route("Café society"), "Caf%C3%A9_society");
    }

    #[test]
    fn test_decode_route() {
        assert_eq!(decode_route("Caf%C3%A9_society"), "Café society");
        assert_eq!(decode_route("Albert_Einstein"), "Albert Einstein");
        assert_eq!(decode_route("Plain title"), "Plain title");
    }

    #[test]
    fn test_route_round_trip() {
        let title = "C++ (programming language)";
        assert_eq!(decode_route(&encode_route(title)), title);
    }

    #[test]
    fn test_decode_invalid_utf8_kept() {
        assert_eq!(decode_route("%FF"), "%FF");
    }

    #[test]
    fn test_title_from_input() {
        assert_eq!(title_from_input("Blue whale"), "Blue whale");
        assert_eq!(title_from_input("/article/AC%2FDC"), "AC/DC");
        assert_eq!(title_from_input("Caf%C3%A9_society"), "Café society");
        assert_eq!(
            title_from_input("https://en.wikipedia.org/wiki/Blue_whale#Diet"),
            "Blue whale"
        );
    }
}
