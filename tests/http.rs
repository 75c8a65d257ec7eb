use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct DayResponse {
    date: String,
    note: String,
    habits: Vec<bool>,
    percent: u8,
}

#[derive(Debug, Deserialize)]
struct WeeklyPoint {
    date: String,
    completed: usize,
}

#[derive(Debug, Deserialize)]
struct WeeklyResponse {
    days: Vec<WeeklyPoint>,
}

#[derive(Debug, Deserialize)]
struct DayFlags {
    date: String,
    is_today: bool,
    has_any_completion: bool,
}

#[derive(Debug, Deserialize)]
struct MonthProjection {
    days: Vec<DayFlags>,
}

#[derive(Debug, Deserialize)]
struct CalendarResponse {
    year: i32,
    months: Vec<MonthProjection>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Mutex<Vec<i32>> = Mutex::new(Vec::new());

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().copied().filter(|pid| *pid > 0) {
                unsafe {
                    libc::kill(pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/day")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(envs: &[(&str, &str)]) -> TestServer {
    let port = pick_free_port();
    let data_path = unique_data_path();
    let child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", data_path)
        .env("APP_NOTE_DEBOUNCE_MS", "100")
        .env("RUST_LOG", "info")
        .envs(envs.iter().copied())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server(&[]).await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_day(client: &Client, base_url: &str, date: &str) -> DayResponse {
    client
        .get(format!("{base_url}/api/days/{date}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_day_is_created_on_first_access() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let day = get_day(&client, &server.base_url, "2026-03-05").await;
    assert_eq!(day.date, "2026-03-05");
    assert_eq!(day.note, "");
    assert_eq!(day.habits, vec![false; 10]);
    assert_eq!(day.percent, 0);

    let history: serde_json::Value = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["days"]["2026-03-05"].is_object());
}

#[tokio::test]
async fn http_toggle_updates_percent_and_views() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let today: DayResponse = client
        .get(format!("{}/api/day", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let mut habits = vec![false; 10];
    habits[2] = true;
    let saved: DayResponse = client
        .put(format!("{}/api/day/habits", server.base_url))
        .json(&serde_json::json!({ "date": today.date, "habits": habits }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved.percent, 10);

    let toggled: DayResponse = client
        .post(format!("{}/api/day/habit", server.base_url))
        .json(&serde_json::json!({ "date": today.date, "index": 5, "value": true }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled.percent, 20);
    assert!(toggled.habits[2] && toggled.habits[5]);

    let weekly: WeeklyResponse = client
        .get(format!("{}/api/weekly", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(weekly.days.len(), 7);
    let last = weekly.days.last().unwrap();
    assert_eq!(last.date, today.date);
    assert_eq!(last.completed, 2);

    let calendar: CalendarResponse = client
        .get(format!("{}/api/calendar", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(calendar.months.len(), 12);
    assert_eq!(today.date[..4].parse::<i32>().unwrap(), calendar.year);
    let cell = calendar
        .months
        .iter()
        .flat_map(|month| &month.days)
        .find(|flags| flags.date == today.date)
        .expect("today missing from calendar");
    assert!(cell.is_today);
    assert!(cell.has_any_completion);
}

#[tokio::test]
async fn http_rejects_invalid_input_without_changes() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = get_day(&client, &server.base_url, "2026-04-01").await;

    let response = client
        .post(format!("{}/api/day/habit", server.base_url))
        .json(&serde_json::json!({ "date": "2026-04-01", "index": 10, "value": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/api/day/habits", server.base_url))
        .json(&serde_json::json!({ "date": "2026-04-01", "habits": [true, true] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{}/api/days/2026-4-1", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let after = get_day(&client, &server.base_url, "2026-04-01").await;
    assert_eq!(after.habits, before.habits);
}

#[tokio::test]
async fn http_malformed_body_date_is_bad_request() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/day/habit", server.base_url))
        .json(&serde_json::json!({ "date": "2026-4-1", "index": 0, "value": true }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/api/day/note", server.base_url))
        .json(&serde_json::json!({ "date": "yesterday", "note": "lost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/day/note/draft", server.base_url))
        .json(&serde_json::json!({ "date": "2026-02-30", "note": "lost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let history: serde_json::Value = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["days"].get("2026-4-1").is_none());
}

#[tokio::test]
async fn http_history_replace_rejects_wrong_length() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .put(format!("{}/api/history", server.base_url))
        .json(&serde_json::json!({
            "days": { "2026-07-01": { "note": "", "habits": [true, false] } }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let history: serde_json::Value = client
        .get(format!("{}/api/history", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["days"].get("2026-07-01").is_none());
}

#[tokio::test]
async fn http_events_stream_reports_toggles() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let mut stream = client
        .get(format!("{}/api/events", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(stream.status().is_success());

    let toggled = client
        .post(format!("{}/api/day/habit", server.base_url))
        .json(&serde_json::json!({ "date": "2026-06-01", "index": 3, "value": true }))
        .send()
        .await
        .unwrap();
    assert!(toggled.status().is_success());

    let received = tokio::time::timeout(Duration::from_secs(3), async {
        let mut seen = String::new();
        while let Some(chunk) = stream.chunk().await.unwrap() {
            seen.push_str(&String::from_utf8_lossy(&chunk));
            if seen.contains("event: day_updated") && seen.contains("2026-06-01") {
                return seen;
            }
        }
        panic!("event stream closed early: {seen}");
    })
    .await
    .expect("no day_updated event");
    assert!(received.contains("\"type\":\"day_updated\""));
}

#[tokio::test]
async fn http_startup_refuses_unreadable_data_file() {
    let data_path = unique_data_path();
    let truncated = br#"{"days":{"2026-01-01":{"note":"keep","habits":[tr"#;
    std::fs::write(&data_path, truncated).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_habit_tracker"))
        .env("PORT", pick_free_port().to_string())
        .env("APP_DATA_PATH", &data_path)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let deadline = Instant::now() + Duration::from_secs(3);
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("server started on an unreadable data file");
        }
        sleep(Duration::from_millis(50)).await;
    };
    assert!(!status.success());
    assert_eq!(std::fs::read(&data_path).unwrap(), truncated);
    let _ = std::fs::remove_file(data_path);
}

#[tokio::test]
async fn http_note_saves_directly_and_by_draft() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let saved: DayResponse = client
        .put(format!("{}/api/day/note", server.base_url))
        .json(&serde_json::json!({ "date": "2026-05-01", "note": "first" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(saved.note, "first");

    for draft in ["s", "se", "sec", "second"] {
        let response = client
            .post(format!("{}/api/day/note/draft", server.base_url))
            .json(&serde_json::json!({ "date": "2026-05-01", "note": draft }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if get_day(&client, &server.base_url, "2026-05-01").await.note == "second" {
            break;
        }
        assert!(Instant::now() < deadline, "draft never saved");
        sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn http_rollover_with_simulated_clock() {
    let server = spawn_server(&[("APP_CLOCK_START", "2026-03-05T23:59:57")]).await;
    let client = Client::new();

    let toggled = client
        .post(format!("{}/api/day/habit", server.base_url))
        .json(&serde_json::json!({ "date": "2026-03-05", "index": 0, "value": true }))
        .send()
        .await
        .unwrap();
    assert!(toggled.status().is_success());

    let deadline = Instant::now() + Duration::from_secs(8);
    let today = loop {
        let day: DayResponse = client
            .get(format!("{}/api/day", server.base_url))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if day.date == "2026-03-06" {
            break day;
        }
        assert!(Instant::now() < deadline, "no rollover, still {}", day.date);
        sleep(Duration::from_millis(200)).await;
    };
    assert_eq!(today.habits, vec![false; 10]);
    assert_eq!(today.note, "");

    let yesterday = get_day(&client, &server.base_url, "2026-03-05").await;
    assert!(yesterday.habits[0]);
    assert_eq!(yesterday.percent, 10);
}
