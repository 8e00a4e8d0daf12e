//! Server-rendered HTML for the outcome and list pages.

use axum::response::Html;

use crate::{games::repo::Game, users::repo_types::User};

/// Title/content pair shown after the OAuth callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub title: String,
    pub content: String,
}

impl Outcome {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            _ => output.push(ch),
        }
    }
    output
}

fn layout(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <nav><a href="/home">Games</a> | <a href="/users">Users</a> | <a href="/register">Register</a></nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
        body = body,
    ))
}

pub fn render_outcome(outcome: &Outcome) -> Html<String> {
    let body = format!(
        "    <h1>{}</h1>\n    <p>{}</p>",
        escape_html(&outcome.title),
        escape_html(&outcome.content)
    );
    layout(&outcome.title, &body)
}

pub fn render_users(users: &[User]) -> Html<String> {
    let mut body = String::from("    <h1>Registered users</h1>\n");
    if users.is_empty() {
        body.push_str("    <p>No users registered yet.</p>");
        return layout("Users", &body);
    }
    body.push_str("    <ul>\n");
    for u in users {
        body.push_str(&format!(
            "        <li><a href=\"{}\">{}</a></li>\n",
            escape_html(&u.url),
            escape_html(&u.username)
        ));
    }
    body.push_str("    </ul>");
    layout("Users", &body)
}

pub fn render_games(games: &[Game]) -> Html<String> {
    let mut body = String::from("    <h1>Games</h1>\n");
    if games.is_empty() {
        body.push_str("    <p>No games yet.</p>");
        return layout("Games", &body);
    }
    body.push_str("    <table>\n        <tr><th>Game</th><th>White</th><th>Black</th></tr>\n");
    for g in games {
        body.push_str(&format!(
            "        <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape_html(&g.id),
            escape_html(&g.white),
            escape_html(&g.black)
        ));
    }
    body.push_str("    </table>");
    layout("Games", &body)
}
