//! Document shell.

use super::{escape, playground};
use crate::session::PlaygroundView;

/// Full playground page for one session.
pub fn page(session_id: &str, view: &PlaygroundView) -> String {
    let base = format!("/playground/{session_id}");
    let api_key = escape(&view.api_key);
    let content = playground::section(session_id, view);
    let navbar = navbar();

    format!(
        r##"<!DOCTYPE html>
<html lang="en" class="dark">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <meta name="description" content="Memory API Playground">
    <title>Memory Playground</title>
    <script src="https://unpkg.com/htmx.org@2.0.8"></script>
</head>
<body class="min-h-screen bg-gray-900 text-white">
    <header class="bg-blue-600 p-4">
        <div class="max-w-4xl mx-auto flex items-center justify-between">
            <div class="flex items-center">
                <a href="/" class="text-white hover:text-gray-200 mr-4">&larr;</a>
                <h1 class="text-xl font-bold">Memory Playground</h1>
            </div>
            <div class="flex items-center space-x-2">
                <input id="api-key" type="password" name="value" value="{api_key}"
                    placeholder="Memory API Key"
                    hx-post="{base}/settings" hx-trigger="change"
                    hx-vals='{{"field": "api_key"}}'
                    hx-target="#playground" hx-swap="outerHTML">
                <button hx-post="{base}/connect"
                    hx-target="#playground" hx-swap="outerHTML">Connect</button>
            </div>
        </div>
    </header>

    <main class="max-w-4xl mx-auto p-4 pb-20" hx-target="#playground" hx-swap="outerHTML">
        {content}
    </main>

    {navbar}
</body>
</html>"##
    )
}

/// Fixed bottom navigation.
fn navbar() -> String {
    let links = [("/", "Home", false), ("/playground", "Playground", true)]
        .iter()
        .map(|(href, label, active)| {
            let class = if *active {
                "text-blue-500"
            } else {
                "text-gray-400 hover:text-white"
            };
            format!(r#"<a href="{href}" class="flex flex-col items-center text-sm {class}"><span class="mt-1">{label}</span></a>"#)
        })
        .collect::<String>();

    format!(
        r#"<nav class="fixed bottom-0 left-0 right-0 h-16 bg-gray-900 border-t border-gray-800 flex justify-center items-center">
        <div class="flex space-x-8">{links}</div>
    </nav>"#
    )
}
