use anyhow::Result;
use ratatui::layout::Rect;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::error;

use crate::api::{self, ChatApi};
use crate::config::Config;
use crate::transcript::{Role, Transcript};

/// Shown when the reply task itself dies rather than returning a failure.
pub const PROCESSING_ERROR: &str = "Sorry, there was an error processing your request.";

fn error_reply(detail: &str) -> String {
    format!("Sorry, I encountered an error: {}", detail)
}

/// How submissions are triggered. Decided once at startup from the config
/// and never re-evaluated per event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBinding {
    /// Plain input line; Enter is the only trigger and no Send control
    /// is rendered.
    FormBound,
    /// A Send control sits next to the input; clicking it and pressing
    /// Enter both submit, independently of each other.
    ButtonAndKey,
}

impl SubmitBinding {
    pub fn from_config(config: &Config) -> Self {
        if config.send_button {
            SubmitBinding::ButtonAndKey
        } else {
            SubmitBinding::FormBound
        }
    }

    pub fn has_button(self) -> bool {
        self == SubmitBinding::ButtonAndKey
    }
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub transcript: Transcript,

    // Input state
    pub input: String,
    pub cursor: usize, // char position in input

    // Send control state: true while a reply is outstanding (the control
    // is disabled and submissions are ignored)
    pub awaiting_reply: bool,
    pub reply_task: Option<JoinHandle<Result<Value>>>,

    // Wiring decided at startup
    pub submit_binding: SubmitBinding,
    pub show_history: bool,

    // Chat pane scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // inner height, set during render
    pub chat_width: u16,  // inner width, for wrap calculations

    // Animation state for the sending indicator (0-2 ellipsis frames)
    pub animation_frame: u8,

    // Control hit areas, refreshed during render. None means the control is
    // not part of the current layout; every consumer treats that as a no-op.
    pub chat_area: Option<Rect>,
    pub send_button_area: Option<Rect>,
    pub login_area: Option<Rect>,
    pub register_area: Option<Rect>,

    pub api: ChatApi,
}

impl App {
    pub fn new(api: ChatApi, config: &Config) -> Self {
        Self {
            should_quit: false,
            transcript: Transcript::new(),

            input: String::new(),
            cursor: 0,

            awaiting_reply: false,
            reply_task: None,

            submit_binding: SubmitBinding::from_config(config),
            show_history: config.history_panel,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            chat_area: None,
            send_button_area: None,
            login_area: None,
            register_area: None,

            api,
        }
    }

    /// First half of a submission: validate the input, record the user
    /// message, and flip the send control into its sending state.
    ///
    /// Returns the trimmed text to put on the wire, or None when the
    /// attempt is rejected (blank input, or a reply already outstanding).
    /// Rejected attempts leave the transcript and the input untouched.
    pub fn begin_submit(&mut self) -> Option<String> {
        if self.awaiting_reply {
            return None;
        }

        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        // Clear the input right away, before the call settles
        self.input.clear();
        self.cursor = 0;

        self.transcript.push(Role::User, message.clone());
        self.awaiting_reply = true;
        self.scroll_to_bottom();

        Some(message)
    }

    /// Second half of a submission: convert the settled transport call
    /// into exactly one assistant message and re-enable the send control.
    ///
    /// Every failure kind collapses to apologetic chat text; the detail
    /// has already been logged by the transport layer.
    pub fn finish_submit(&mut self, outcome: Result<Value>) {
        let reply = match outcome {
            Ok(body) => {
                if let Some(detail) = api::extract_error(&body) {
                    error_reply(&detail)
                } else {
                    api::extract_reply(&body).unwrap_or_else(|| api::NO_REPLY_FALLBACK.to_string())
                }
            }
            Err(err) => error_reply(&err.to_string()),
        };

        self.transcript.push(Role::Assistant, reply);
        self.awaiting_reply = false;
        self.scroll_to_bottom();
    }

    /// Join the outstanding reply task if it has settled.
    ///
    /// A task that died (panicked) still produces an assistant message, so
    /// the one-reply-per-submission invariant holds on every path.
    pub async fn poll_reply(&mut self) {
        let finished = self
            .reply_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(task) = self.reply_task.take() {
            match task.await {
                Ok(outcome) => self.finish_submit(outcome),
                Err(err) => {
                    error!("reply task failed: {err}");
                    self.transcript.push(Role::Assistant, PROCESSING_ERROR);
                    self.awaiting_reply = false;
                    self.scroll_to_bottom();
                }
            }
        }
    }

    /// Tick the sending indicator (driven by the event loop's Tick).
    pub fn tick_animation(&mut self) {
        if self.awaiting_reply {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    /// Pin the chat pane to its newest line, so the latest message (or the
    /// sending indicator) is visible.
    pub fn scroll_to_bottom(&mut self) {
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.transcript.messages() {
            // Wrapped text lines, counted in chars for UTF-8 safety
            for line in msg.text.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 2; // time label + blank line after message
        }

        if self.awaiting_reply {
            total_lines += 1; // sending indicator row
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines - visible_height;
        } else {
            self.chat_scroll = 0;
        }
    }
}
