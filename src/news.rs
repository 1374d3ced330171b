#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub headline: &'static str,
    pub details: &'static [&'static str],
}

pub const NEWS: &[NewsItem] = &[NewsItem {
    headline: "Minecraft 1.20.4 is out!",
    details: &[
        "New content:",
        "- Camel mob",
        "- Bamboo wood block set",
        "- Hanging signs",
    ],
}];

pub fn render_lines(items: &[NewsItem]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(item.headline.to_string());
        lines.push(String::new());
        lines.extend(item.details.iter().map(|d| d.to_string()));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_precedes_details() {
        let lines = render_lines(NEWS);
        assert_eq!(lines[0], "Minecraft 1.20.4 is out!");
        assert_eq!(lines[1], "");
        assert_eq!(lines.last().map(String::as_str), Some("- Hanging signs"));
    }
}
