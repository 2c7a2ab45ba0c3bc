/// Single-page frontend. Holds no state beyond the session id; every render
/// comes from the server's `SessionView`.
pub(crate) const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Code Cleaner</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 72rem; padding: 0 1rem; }
  textarea { width: 100%; min-height: 16rem; font-family: ui-monospace, monospace; }
  pre { background: #f5f5f5; padding: 0.75rem; overflow-x: auto; white-space: pre-wrap; }
  .row { display: flex; gap: 1rem; }
  .row > div { flex: 1; min-width: 0; }
  .actions button { margin-right: 0.5rem; }
  #status { min-height: 1.5rem; }
  .warning { color: #9a6700; }
  .error { color: #b42318; }
  .hidden { display: none; }
</style>
</head>
<body>
<h1>Code Cleaner</h1>
<p>Paste code or upload a file, then optimize or explain it.</p>

<input type="file" id="file">
<p>Detected language: <strong id="language">unknown</strong></p>
<textarea id="input" placeholder="Paste your code here"></textarea>

<div class="actions">
  <button id="optimize">Optimize Code</button>
  <button id="explain">Explain Code</button>
  <button id="explain-latest">Explain Optimized Code</button>
  <button id="revert">Revert</button>
  <button id="clear">Clear All</button>
  <a id="download" class="hidden">Download Optimized Code</a>
</div>
<p id="status"></p>

<div id="comparison" class="row hidden">
  <div><h3>Original</h3><pre id="original"></pre></div>
  <div><h3>Optimized</h3><pre id="cleaned"></pre></div>
</div>
<div id="explanation-box" class="hidden">
  <h3>Explanation</h3>
  <pre id="explanation"></pre>
</div>

<script>
const $ = (id) => document.getElementById(id);
let sessionId = sessionStorage.getItem("session_id");
let typingTimer = null;

async function call(method, path, body, headers) {
  const res = await fetch(path, { method, body, headers });
  const data = await res.json().catch(() => ({}));
  if (!res.ok) throw new Error(data.message || res.statusText);
  return data;
}

async function ensureSession() {
  if (sessionId) {
    const res = await fetch(`/sessions/${sessionId}`);
    if (res.ok) return render(await res.json());
  }
  const created = await call("POST", "/sessions");
  sessionId = created.session_id;
  sessionStorage.setItem("session_id", sessionId);
  render(await call("GET", `/sessions/${sessionId}`));
}

function setStatus(text, kind) {
  $("status").textContent = text || "";
  $("status").className = kind || "";
}

function render(view) {
  if (view.reset_input_widget) {
    $("input").value = "";
    $("file").value = "";
  } else if (document.activeElement !== $("input")) {
    $("input").value = view.pending_input;
  }
  const lang = view.language.language;
  $("language").textContent = lang ? (view.language.recognized ? lang : `${lang} (guess)`) : "unknown";

  const cmp = view.comparison;
  $("comparison").classList.toggle("hidden", !cmp);
  if (cmp) {
    $("original").textContent = cmp.original_code;
    $("cleaned").textContent = cmp.cleaned_code;
  }
  const hasHistory = view.history_len > 0;
  $("download").classList.toggle("hidden", !hasHistory);
  $("download").href = `/sessions/${sessionId}/download`;
  $("explain-latest").disabled = !hasHistory;
}

async function run(label, fn) {
  setStatus(`${label}...`);
  try {
    await fn();
  } catch (err) {
    setStatus(err.message, "error");
  }
}

let pendingEdit = null;

// Sends the debounced typed edit now, if one is waiting.
async function flushInput() {
  if (!typingTimer) return;
  clearTimeout(typingTimer);
  typingTimer = null;
  const edit = pendingEdit;
  pendingEdit = null;
  const res = await call("PUT", `/sessions/${sessionId}/input`,
    JSON.stringify({ text: edit.text, edited_at: edit.editedAt }),
    { "content-type": "application/json" });
  render(res.view);
}

function dropPendingInput() {
  clearTimeout(typingTimer);
  typingTimer = null;
  pendingEdit = null;
}

$("input").addEventListener("input", () => {
  clearTimeout(typingTimer);
  pendingEdit = { text: $("input").value, editedAt: new Date().toISOString() };
  typingTimer = setTimeout(() => run("Saving", async () => {
    await flushInput();
    setStatus("");
  }), 300);
});

$("file").addEventListener("change", () => {
  const file = $("file").files[0];
  if (!file) return;
  const editedAt = new Date().toISOString();
  run("Uploading", async () => {
    const query = new URLSearchParams({ filename: file.name, edited_at: editedAt });
    const res = await call("POST", `/sessions/${sessionId}/upload?${query}`, await file.arrayBuffer());
    $("input").blur();
    render(res.view);
    setStatus(`Loaded ${file.name}`);
  });
});

$("optimize").addEventListener("click", () => run("Optimizing", async () => {
  await flushInput();
  const res = await call("POST", `/sessions/${sessionId}/optimize`);
  $("explanation-box").classList.add("hidden");
  render(res.view);
  setStatus("Optimized.");
}));

async function explain(path) {
  await flushInput();
  const res = await call("POST", path);
  $("explanation").textContent = res.explanation;
  $("explanation-box").classList.remove("hidden");
  render(res.view);
  setStatus("");
}

$("explain").addEventListener("click", () => run("Explaining", () => explain(`/sessions/${sessionId}/explain`)));
$("explain-latest").addEventListener("click", () => run("Explaining", () => explain(`/sessions/${sessionId}/explain_latest`)));

$("revert").addEventListener("click", () => run("Reverting", async () => {
  const res = await call("POST", `/sessions/${sessionId}/revert`);
  render(res.view);
  setStatus(res.message, res.status === "reverted" ? "" : "warning");
}));

$("clear").addEventListener("click", () => run("Clearing", async () => {
  dropPendingInput();
  const view = await call("POST", `/sessions/${sessionId}/clear`);
  $("explanation-box").classList.add("hidden");
  render(view);
  setStatus("Cleared.");
}));

ensureSession().catch((err) => setStatus(err.message, "error"));
</script>
</body>
</html>
"#;
