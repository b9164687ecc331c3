use crate::models::{DiaryRecord, FormState};
use crate::notify::{Toast, ToastKind};

pub struct FormView<'a> {
    pub form: &'a FormState,
    pub can_delete: bool,
    pub error_message: Option<&'a str>,
    pub toasts: &'a [Toast],
    pub list_path: &'a str,
}

pub fn render_form_page(view: &FormView<'_>) -> String {
    let score_options: String = (1..=10)
        .map(|score| {
            let selected = if score == view.form.mental_score { " selected" } else { "" };
            format!(r#"<option value="{score}"{selected}>{score}</option>"#)
        })
        .collect();

    let error = view
        .error_message
        .map(|message| format!(r#"<p class="inline-error">{}</p>"#, escape(message)))
        .unwrap_or_default();

    let delete = if view.can_delete {
        DELETE_FORM.to_string()
    } else {
        String::new()
    };

    FORM_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{TOASTS}}", &render_toasts(view.toasts))
        .replace("{{LIST_PATH}}", &escape(view.list_path))
        .replace("{{ERROR}}", &error)
        .replace("{{SCORES}}", &score_options)
        .replace("{{DELETE}}", &delete)
        .replace("{{DATE}}", &escape(&view.form.date))
        .replace("{{CONTENT}}", &escape(&view.form.content))
}

pub fn render_list_page(records: &[DiaryRecord], toasts: &[Toast]) -> String {
    let rows: String = if records.is_empty() {
        r#"<li class="empty">No diaries loaded yet.</li>"#.to_string()
    } else {
        records
            .iter()
            .map(|record| {
                format!(
                    r#"<li><form method="post" action="/diary/date"><input type="hidden" name="date" value="{date}" /><button class="link" type="submit">{date}</button></form><span class="score">{mental}/10</span><p>{diary}</p></li>"#,
                    date = escape(&record.date),
                    mental = record.mental,
                    diary = escape(&record.diary),
                )
            })
            .collect()
    };

    LIST_HTML
        .replace("{{STYLE}}", STYLE)
        .replace("{{TOASTS}}", &render_toasts(toasts))
        .replace("{{ROWS}}", &rows)
}

fn render_toasts(toasts: &[Toast]) -> String {
    toasts
        .iter()
        .map(|toast| {
            let kind = match toast.kind {
                ToastKind::Loading => "loading",
                ToastKind::Success => "success",
                ToastKind::Error => "error",
            };
            let duration = toast.duration_ms.map(|ms| ms.to_string()).unwrap_or_default();
            format!(
                r#"<div class="toast {kind}" data-duration="{duration}">{}</div>"#,
                escape(&toast.message)
            )
        })
        .collect()
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
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

const DELETE_FORM: &str = r#"<form class="danger" method="post" action="/diary/delete">
        <label><input type="checkbox" name="confirm" /> Yes, delete this diary</label>
        <button class="btn-delete" type="submit">Delete</button>
      </form>"#;

const STYLE: &str = r#"<style>
    :root {
      --bg: #eef2f0;
      --ink: #23302b;
      --accent: #3f8f6b;
      --danger: #c2453a;
      --card: rgba(255, 255, 255, 0.9);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #dfe9f2);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: 0 20px 50px rgba(35, 48, 43, 0.15);
      padding: 32px;
      display: grid;
      gap: 22px;
    }

    h1 {
      margin: 0;
      font-family: "Georgia", serif;
    }

    .date-nav {
      display: flex;
      gap: 10px;
      align-items: center;
    }

    .date-nav form {
      display: flex;
      gap: 8px;
    }

    textarea {
      width: 100%;
      min-height: 180px;
      border-radius: 14px;
      padding: 12px;
      font: inherit;
    }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: white;
    }

    button.link {
      background: none;
      color: var(--accent);
      padding: 0;
    }

    .btn-delete {
      background: var(--danger);
    }

    .inline-error {
      color: var(--danger);
      margin: 0;
    }

    .toasts {
      position: fixed;
      top: 16px;
      right: 16px;
      display: grid;
      gap: 8px;
    }

    .toast {
      padding: 10px 16px;
      border-radius: 12px;
      background: white;
      box-shadow: 0 8px 20px rgba(0, 0, 0, 0.12);
    }

    .toast.success {
      border-left: 4px solid var(--accent);
    }

    .toast.error {
      border-left: 4px solid var(--danger);
    }

    ul.diaries {
      list-style: none;
      padding: 0;
      display: grid;
      gap: 12px;
    }
  </style>
  <script>
    window.addEventListener('DOMContentLoaded', () => {
      document.querySelectorAll('.toast[data-duration]').forEach((toast) => {
        const ms = Number(toast.dataset.duration);
        if (ms > 0) {
          setTimeout(() => toast.remove(), ms);
        }
      });
    });
  </script>"#;

const FORM_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mental Diary</title>
  {{STYLE}}
</head>
<body>
  <div class="toasts">{{TOASTS}}</div>
  <main class="app">
    <header>
      <h1>Mental Diary</h1>
      <a href="{{LIST_PATH}}">All diaries</a>
    </header>

    <section class="date-nav">
      <form method="post" action="/diary/prev"><button type="submit">&larr;</button></form>
      <form method="post" action="/diary/date">
        <input type="date" name="date" value="{{DATE}}" />
        <button type="submit">Go</button>
      </form>
      <form method="post" action="/diary/next"><button type="submit">&rarr;</button></form>
    </section>

    {{ERROR}}

    <form method="post" action="/diary">
      <label>
        Mental score
        <select name="mental_score">{{SCORES}}</select>
      </label>
      <textarea name="content" placeholder="How was today?">{{CONTENT}}</textarea>
      <button type="submit">Save</button>
    </form>

    {{DELETE}}
  </main>
</body>
</html>
"#;

const LIST_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mental Diary - Diaries</title>
  {{STYLE}}
</head>
<body>
  <div class="toasts">{{TOASTS}}</div>
  <main class="app">
    <header>
      <h1>Diaries</h1>
      <a href="/diary">Back to the form</a>
    </header>
    <ul class="diaries">{{ROWS}}</ul>
  </main>
</body>
</html>
"#;
