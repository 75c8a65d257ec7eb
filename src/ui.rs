use crate::date_key::DateKey;
use crate::models::DayRecord;

pub fn render_index(date: DateKey, habits: &[String], record: &DayRecord, percent: u8) -> String {
    let rows: String = habits
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let checked = if record.habits.get(index).copied().unwrap_or(false) {
                " checked"
            } else {
                ""
            };
            format!(
                "<tr><td>{}</td><td><input type=\"checkbox\" data-i=\"{index}\"{checked} /></td></tr>",
                escape(name)
            )
        })
        .collect();

    let date = date.to_string();
    let note = escape(&record.note);
    let percent = percent.to_string();
    fill(INDEX_HTML, |name| match name {
        "DATE" => Some(date.as_str()),
        "ROWS" => Some(rows.as_str()),
        "NOTE" => Some(note.as_str()),
        "PERCENT" => Some(percent.as_str()),
        _ => None,
    })
}

/// Single pass over the template, so inserted values are never rescanned.
fn fill<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start + 2..];
        match tail.find("}}").and_then(|end| Some((end, lookup(&tail[..end])?))) {
            Some((end, value)) => {
                out.push_str(value);
                rest = &tail[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
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

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Consistency Tracker</title>
  <style>
    :root {
      --bg: #111214;
      --card: #1b1d21;
      --ink: #f2efe9;
      --muted: #8d8a85;
      --accent: #ff7a18;
      --done: #3fb37f;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      display: grid;
      gap: 20px;
    }

    header h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.4rem);
    }

    #countdown {
      color: var(--accent);
      letter-spacing: 0.08em;
      font-size: 0.85rem;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 22px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td {
      padding: 8px 4px;
      border-bottom: 1px solid #2a2d33;
    }

    td:last-child {
      text-align: right;
    }

    .progress {
      height: 10px;
      border-radius: 999px;
      background: #2a2d33;
      overflow: hidden;
    }

    #progress-bar {
      height: 100%;
      background: var(--accent);
      transition: width 200ms ease;
    }

    textarea {
      width: 100%;
      min-height: 120px;
      background: #15171a;
      color: var(--ink);
      border: 1px solid #2a2d33;
      border-radius: 12px;
      padding: 12px;
      font: inherit;
    }

    .bars {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      align-items: end;
      gap: 10px;
      height: 160px;
    }

    .bar {
      background: var(--accent);
      border-radius: 6px 6px 0 0;
      min-height: 2px;
    }

    .bar-label {
      text-align: center;
      color: var(--muted);
      font-size: 0.8rem;
    }

    .calendar {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
      gap: 14px;
    }

    .month h3 {
      margin: 0 0 8px;
      font-size: 0.95rem;
    }

    .days {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 3px;
    }

    .day {
      font-size: 0.7rem;
      text-align: center;
      padding: 4px 0;
      border-radius: 4px;
      background: #23262b;
    }

    .day.past {
      color: var(--muted);
    }

    .day.done {
      background: var(--done);
      color: #0c0d0e;
    }

    .day.today {
      outline: 2px solid var(--accent);
    }

    .status {
      color: var(--muted);
      font-size: 0.85rem;
      min-height: 1.2em;
    }

    .status.error {
      color: #ff5a5a;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Consistency Tracker</h1>
      <div id="today-label">{{DATE}}</div>
      <div id="countdown"></div>
    </header>

    <section class="card">
      <table id="habit-table">{{ROWS}}</table>
      <p id="progress-text">{{PERCENT}}% Completed Today</p>
      <div class="progress"><div id="progress-bar" style="width: {{PERCENT}}%"></div></div>
    </section>

    <section class="card">
      <textarea id="daily-note" placeholder="How did today go?">{{NOTE}}</textarea>
      <div id="note-status" class="status"></div>
    </section>

    <section class="card">
      <div class="bars" id="weekly-bars"></div>
      <div class="bars" id="weekly-labels" style="height: auto"></div>
    </section>

    <section class="card">
      <div class="calendar" id="calendar"></div>
    </section>
  </main>

  <script>
    let todayKey = '{{DATE}}';
    let habitCount = document.querySelectorAll('#habit-table input').length;

    const table = document.getElementById('habit-table');
    const noteBox = document.getElementById('daily-note');
    const noteStatus = document.getElementById('note-status');

    const setStatus = (message, tone) => {
      noteStatus.textContent = message;
      noteStatus.className = `status ${tone || ''}`;
    };

    const getJson = async (url) => {
      const res = await fetch(url);
      if (!res.ok) {
        throw new Error(await res.text() || `Request failed: ${url}`);
      }
      return res.json();
    };

    const sendJson = async (method, url, body) => {
      const res = await fetch(url, {
        method,
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      });
      if (!res.ok) {
        throw new Error(await res.text() || 'Request failed');
      }
      return res.json();
    };

    const renderDay = (day) => {
      todayKey = day.date;
      document.getElementById('today-label').textContent = day.date;
      table.querySelectorAll('input').forEach((input) => {
        input.checked = Boolean(day.habits[Number(input.dataset.i)]);
      });
      if (document.activeElement !== noteBox) {
        noteBox.value = day.note;
      }
      document.getElementById('progress-bar').style.width = `${day.percent}%`;
      document.getElementById('progress-text').textContent = `${day.percent}% Completed Today`;
    };

    const renderWeekly = (weekly) => {
      const bars = document.getElementById('weekly-bars');
      const labels = document.getElementById('weekly-labels');
      bars.innerHTML = '';
      labels.innerHTML = '';
      weekly.days.forEach((day) => {
        const bar = document.createElement('div');
        bar.className = 'bar';
        bar.style.height = `${(day.completed / Math.max(habitCount, 1)) * 100}%`;
        bar.title = `${day.date}: ${day.completed}`;
        bars.appendChild(bar);

        const label = document.createElement('div');
        label.className = 'bar-label';
        label.textContent = day.weekday;
        labels.appendChild(label);
      });
    };

    const renderCalendar = (calendar) => {
      const root = document.getElementById('calendar');
      root.innerHTML = '';
      calendar.months.forEach((month) => {
        const monthDiv = document.createElement('div');
        monthDiv.className = 'month';
        const title = document.createElement('h3');
        title.textContent = `${month.name} ${calendar.year}`;
        monthDiv.appendChild(title);

        const grid = document.createElement('div');
        grid.className = 'days';
        month.days.forEach((flags) => {
          const cell = document.createElement('div');
          cell.className = 'day';
          cell.classList.toggle('past', flags.is_past);
          cell.classList.toggle('today', flags.is_today);
          cell.classList.toggle('done', flags.has_any_completion);
          cell.textContent = flags.day;
          grid.appendChild(cell);
        });
        monthDiv.appendChild(grid);
        root.appendChild(monthDiv);
      });
    };

    const renderCountdown = (countdown) => {
      document.getElementById('countdown').textContent =
        `${countdown.days} DAYS • ${countdown.hours} HRS • ${countdown.minutes} MIN • ${countdown.seconds} SEC LEFT`;
    };

    const refreshDay = async () => renderDay(await getJson('/api/day'));
    const refreshViews = async () => {
      const [weekly, calendar] = await Promise.all([
        getJson('/api/weekly'),
        getJson('/api/calendar')
      ]);
      renderWeekly(weekly);
      renderCalendar(calendar);
    };
    const refreshCountdown = async () => renderCountdown(await getJson('/api/countdown'));

    table.addEventListener('change', (event) => {
      const index = Number(event.target.dataset.i);
      sendJson('POST', '/api/day/habit', { date: todayKey, index, value: event.target.checked })
        .then(renderDay)
        .catch((err) => setStatus(err.message, 'error'));
    });

    noteBox.addEventListener('input', () => {
      setStatus('Saving...', '');
      sendJson('POST', '/api/day/note/draft', { date: todayKey, note: noteBox.value })
        .catch((err) => setStatus(err.message, 'error'));
    });

    const events = new EventSource('/api/events');
    events.addEventListener('day_updated', (event) => {
      const payload = JSON.parse(event.data);
      if (payload.date === todayKey) {
        setStatus('Saved ✔', '');
      }
      refreshViews().catch((err) => setStatus(err.message, 'error'));
    });
    events.addEventListener('rolled_over', () => {
      Promise.all([refreshDay(), refreshViews()]).catch((err) => setStatus(err.message, 'error'));
    });
    events.addEventListener('history_replaced', () => {
      Promise.all([refreshDay(), refreshViews()]).catch((err) => setStatus(err.message, 'error'));
    });
    events.addEventListener('save_failed', (event) => {
      setStatus(`Not saved: ${JSON.parse(event.data).message}`, 'error');
    });

    refreshViews().catch((err) => setStatus(err.message, 'error'));
    refreshCountdown().catch(() => {});
    setInterval(() => refreshCountdown().catch(() => {}), 1000);
  </script>
</body>
</html>
"#;
