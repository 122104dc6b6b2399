//! Browser page served inline; no external static files are needed.

const TITLE_PLACEHOLDER: &str = "__TITLE__";

const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
:root {
  --bg: #fdfdfd;
  --fg: #222;
  --fg2: #777;
  --accent: #0b6bcb;
  --rule: #e4e4e4;
}
* { box-sizing: border-box; }
body {
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', system-ui, sans-serif;
  background: var(--bg);
  color: var(--fg);
  max-width: 960px;
  margin: 0 auto;
  padding: 16px;
}
h1 { font-size: 1.4rem; }
h2 { font-size: 1.1rem; border-bottom: 1px solid var(--rule); padding-bottom: 4px; }
a { color: var(--accent); text-decoration: none; }
a:hover { text-decoration: underline; }
dl { margin: 0; }
dd { margin-left: 1.2em; }
small { color: var(--fg2); }
.heading { cursor: pointer; font-weight: 600; }
.search input {
  width: 100%;
  padding: 8px;
  font-size: 1rem;
  border: 1px solid var(--rule);
  border-radius: 4px;
}
.error { color: #b00020; }
</style>
</head>
<body>
<h1>__TITLE__</h1>
<section class="search">
  <input id="query" type="search" placeholder="Search paths..." autocomplete="off">
  <div id="results"></div>
</section>
<section>
  <h2>Recently modified</h2>
  <div id="recent"></div>
</section>
<section>
  <h2>All files</h2>
  <div id="tree">Loading data...</div>
</section>
<script>
"use strict";

const esc = s => String(s).replace(/[&<>"']/g, c => ({
  "&": "&amp;", "<": "&lt;", ">": "&gt;", '"': "&quot;", "'": "&#39;"
}[c]));

const size = bytes => {
  const units = ["B", "KB", "MB", "GB", "TB"];
  let n = bytes, i = 0;
  while (n >= 1024 && i < units.length - 1) { n /= 1024; i++; }
  return i === 0 ? n + " B" : n.toFixed(2) + " " + units[i];
};

const age = iso => {
  const secs = (Date.now() - new Date(iso).getTime()) / 1000;
  const units = [[31536000, "year"], [2592000, "month"], [604800, "week"],
                 [86400, "day"], [3600, "hour"], [60, "minute"]];
  for (const [unit, name] of units) {
    if (secs >= unit) {
      const n = Math.floor(secs / unit);
      return n + " " + name + (n === 1 ? "" : "s") + " ago";
    }
  }
  return "just now";
};

const fileItem = (f, fullPath) =>
  `<div><a href="${esc(f.download_url)}">${esc(fullPath ? f.path : f.name)}</a> ` +
  `<small>(${size(f.size)}, ${age(f.last_modified)})</small></div>`;

const folder = node => {
  const marker = node.show ? "&#9662;" : "&#9656;";
  let html = `<dl><dt><a class="heading" data-id="${node.id}">${marker} ${esc(node.name)}/</a></dt>`;
  if (node.show) {
    for (const child of node.children) {
      html += "<dd>" + (child.is_dir ? folder(child) : fileItem(child, false)) + "</dd>";
    }
  }
  return html + "</dl>";
};

let tree = null;

const findNode = (node, id) => {
  if (node.id === id) return node;
  for (const child of node.children) {
    const found = findNode(child, id);
    if (found) return found;
  }
  return null;
};

const renderTree = () => {
  const el = document.getElementById("tree");
  el.innerHTML = folder(tree);
  for (const a of el.querySelectorAll("a.heading")) {
    a.addEventListener("click", ev => {
      ev.preventDefault();
      const node = findNode(tree, Number(a.dataset.id));
      node.show = !node.show;
      renderTree();
    });
  }
};

const loadTree = async () => {
  const body = await (await fetch("/api/tree")).json();
  if (body.status === "loading") {
    setTimeout(loadTree, 1000);
    return;
  }
  if (body.status === "error") {
    document.getElementById("tree").innerHTML =
      `<p class="error">Failed to load listing: ${esc(body.message)}</p>`;
    return;
  }
  tree = body.tree;
  renderTree();
  const recent = await (await fetch("/api/recent")).json();
  document.getElementById("recent").innerHTML =
    recent.length ? recent.map(f => fileItem(f, true)).join("") : "<small>Nothing modified recently.</small>";
};

document.getElementById("query").addEventListener("input", async ev => {
  const q = ev.target.value;
  const results = await (await fetch("/api/search?q=" + encodeURIComponent(q))).json();
  if (ev.target.value !== q) return;
  document.getElementById("results").innerHTML = results.map(f => fileItem(f, true)).join("");
});

loadTree();
</script>
</body>
</html>
"##;

/// Escapes text for inclusion in HTML.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Returns the listing page titled `title`.
pub fn index_html(title: &str) -> String {
    PAGE.replace(TITLE_PLACEHOLDER, &escape_html(title))
}
