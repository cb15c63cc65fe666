//! Small SVG text helpers shared by the renderers.

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Formats a coordinate with at most three decimals and no trailing zeros.
pub fn fmt_number(v: f64) -> String {
    if !v.is_finite() || v.abs() < 0.0005 {
        return "0".to_string();
    }
    let mut s = format!("{:.3}", (v * 1000.0).round() / 1000.0);
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    if s == "-0" {
        return "0".to_string();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_number_trims_trailing_zeros() {
        assert_eq!(fmt_number(0.3), "0.3");
        assert_eq!(fmt_number(1.0), "1");
        assert_eq!(fmt_number(400.0), "400");
        assert_eq!(fmt_number(12.34567), "12.346");
        assert_eq!(fmt_number(-0.0001), "0");
        assert_eq!(fmt_number(f64::NAN), "0");
    }

    #[test]
    fn escape_xml_escapes_markup_characters() {
        assert_eq!(
            escape_xml(r#"<Smith & "Jones">"#),
            "&lt;Smith &amp; &quot;Jones&quot;&gt;"
        );
    }
}
