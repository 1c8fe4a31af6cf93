use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use reqwire_core::time::DateTime;
use reqwire_core::{Clock, Context, Error, HttpSend, Result, StaticEnv};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const ACCESS_KEY_ID: &str = "AKIDEXAMPLE";
pub const SECRET_ACCESS_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

/// One scripted reaction of [`ScriptedHttpSend`].
#[derive(Debug, Clone)]
pub enum Reply {
    Response {
        status: u16,
        headers: Vec<(&'static str, &'static str)>,
        body: String,
    },
    NetworkError,
    /// Never answers; only a deadline gets the caller out.
    Hang,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::status(200, body)
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Reply::Response {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn throttled() -> Self {
        Self::status(
            400,
            "<ErrorResponse><Error><Type>Sender</Type><Code>Throttling</Code>\
             <Message>Rate exceeded</Message></Error><RequestId>throttled</RequestId></ErrorResponse>",
        )
    }
}

#[derive(Debug, Default)]
struct Script {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<http::Request<Bytes>>>,
    calls: AtomicUsize,
}

/// HttpSend that answers from a script and records what it was sent.
///
/// Once the script runs out, the last reply repeats.
#[derive(Debug, Clone, Default)]
pub struct ScriptedHttpSend {
    script: Arc<Script>,
}

impl ScriptedHttpSend {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let s = Self::default();
        s.script
            .replies
            .lock()
            .expect("lock must not be poisoned")
            .extend(replies);
        s
    }

    pub fn calls(&self) -> usize {
        self.script.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<http::Request<Bytes>> {
        self.script
            .requests
            .lock()
            .expect("lock must not be poisoned")
            .iter()
            .map(|req| {
                let mut copy = http::Request::new(req.body().clone());
                *copy.method_mut() = req.method().clone();
                *copy.uri_mut() = req.uri().clone();
                *copy.headers_mut() = req.headers().clone();
                copy
            })
            .collect()
    }

    pub fn last_request(&self) -> http::Request<Bytes> {
        self.requests()
            .pop()
            .expect("at least one request must have been sent")
    }

    fn next_reply(&self) -> Option<Reply> {
        let mut replies = self.script.replies.lock().expect("lock must not be poisoned");
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    }
}

#[async_trait]
impl HttpSend for ScriptedHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.script.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .requests
            .lock()
            .expect("lock must not be poisoned")
            .push(req);

        match self.next_reply() {
            Some(Reply::Response {
                status,
                headers,
                body,
            }) => {
                let mut builder = http::Response::builder().status(status);
                for (k, v) in headers {
                    builder = builder.header(k, v);
                }
                Ok(builder.body(Bytes::from(body))?)
            }
            Some(Reply::NetworkError) => Err(Error::network("connection reset by peer")),
            Some(Reply::Hang) => {
                tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
                Err(Error::network("hang ended"))
            }
            None => Err(Error::unexpected("script has no replies")),
        }
    }
}

/// Clock that moves one step forward on every reading.
#[derive(Debug)]
pub struct SteppingClock {
    start: DateTime,
    step: chrono::Duration,
    ticks: AtomicUsize,
}

impl SteppingClock {
    pub fn new(start: DateTime, step: chrono::Duration) -> Self {
        Self {
            start,
            step,
            ticks: AtomicUsize::new(0),
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime {
        let n = self.ticks.fetch_add(1, Ordering::SeqCst) as i32;
        self.start + self.step * n
    }
}

pub fn test_time() -> DateTime {
    Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0)
        .single()
        .expect("time must be valid")
}

/// Context with the given env, the scripted sender and a one second stepping clock.
pub fn context_with(envs: &[(&str, &str)], http: &ScriptedHttpSend) -> Context {
    let _ = env_logger::builder().is_test(true).try_init();

    Context::new()
        .with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
        .with_http_send(http.clone())
        .with_clock(SteppingClock::new(test_time(), chrono::Duration::seconds(1)))
}

/// Context with credentials and region in the env.
pub fn test_context(http: &ScriptedHttpSend) -> Context {
    context_with(
        &[
            ("AWS_ACCESS_KEY_ID", ACCESS_KEY_ID),
            ("AWS_SECRET_ACCESS_KEY", SECRET_ACCESS_KEY),
            ("AWS_REGION", "us-east-1"),
        ],
        http,
    )
}

pub fn header<'a>(req: &'a http::Request<Bytes>, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .unwrap_or_else(|| panic!("header {name} must be present"))
        .to_str()
        .expect("header must be ascii")
}
