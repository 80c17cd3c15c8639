use crate::{Mode, Token};

/// Split text into lines, dropping the line terminators.
///
/// Unlike [`str::lines`], a trailing newline yields a final empty line, so
/// joining the lines with `\n` restores the text up to carriage returns.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Tokenize a whole text, threading the state from line to line.
///
/// Returns the tokens of each line, with spans relative to their line.
pub fn highlight<M: Mode>(mode: &M, text: &str) -> Vec<Vec<Token>> {
    let mut state = mode.start_state(0);
    lines(text)
        .map(|line| {
            let (tokens, next) = mode.tokenize_line(line, &state);
            state = next;
            tokens
        })
        .collect()
}

/// Highlight a text as HTML.
///
/// Each classified token is wrapped in a `<span>` with the class's
/// [CSS class](crate::Class::css_class).
pub fn highlight_html<M: Mode>(mode: &M, text: &str) -> String {
    let mut html = String::from("<pre><code>");
    for (i, tokens) in highlight(mode, text).iter().enumerate() {
        if i > 0 {
            html.push('\n');
        }
        for token in tokens {
            if let Some(class) = token.class {
                html.push_str("<span class=\"");
                html.push_str(class.css_class());
                html.push_str("\">");
                escape(&mut html, &token.text);
                html.push_str("</span>");
            } else {
                escape(&mut html, &token.text);
            }
        }
    }
    html.push_str("</code></pre>");
    html
}

fn escape(html: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => html.push_str("&lt;"),
            '>' => html.push_str("&gt;"),
            '&' => html.push_str("&amp;"),
            '\'' => html.push_str("&#39;"),
            '"' => html.push_str("&quot;"),
            _ => html.push(c),
        }
    }
}
