use gloo_timers::callback::Interval;
use leptos::prelude::*;
use shared::controller::{
    Display, KeyDisposition, TestController, TextView, DEFAULT_DURATION_SECS, DURATION_CHOICES,
};
use shared::leaderboard::Leaderboard;
use shared::passages::SAMPLE_TEXTS;
use shared::protocol::ResultRecord;
use std::cell::RefCell;

use crate::browser::{self, now_ms};
use crate::mirror;
use crate::storage::LocalStore;

const COUNTDOWN_MS: u32 = 1_000;

// The page's single test controller. It lives in thread-local storage rather
// than a signal because the countdown Interval is neither Send nor Sync.
thread_local! {
    static CONTROLLER: RefCell<TestController<Interval>> =
        RefCell::new(TestController::new(SAMPLE_TEXTS));
}

fn with_controller<R>(f: impl FnOnce(&mut TestController<Interval>) -> R) -> R {
    CONTROLLER.with(|cell| f(&mut cell.borrow_mut()))
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BoardRow {
    rank: usize,
    wpm: u32,
    accuracy: u32,
    date: String,
}

fn board_rows(board: &Leaderboard) -> Vec<BoardRow> {
    board
        .rows()
        .map(|(rank, r)| BoardRow {
            rank,
            wpm: r.wpm,
            accuracy: r.accuracy,
            date: browser::locale_date(&r.timestamp),
        })
        .collect()
}

#[component]
pub fn App() -> impl IntoView {
    let (display, set_display) = signal(with_controller(|c| c.display()));
    let (board, set_board) = signal(board_rows(&LocalStore::open().leaderboard()));
    let input_ref: NodeRef<leptos::html::Input> = NodeRef::new();

    let publish = move |snapshot: Display| set_display.set(snapshot);

    let clear_input = move || {
        if let Some(input) = input_ref.get_untracked() {
            input.set_value("");
        }
    };

    let start_test = move || {
        let snapshot = with_controller(|c| {
            c.start(&mut rand::thread_rng(), now_ms(), || {
                Interval::new(COUNTDOWN_MS, move || {
                    let snapshot = with_controller(|c| {
                        c.tick(now_ms());
                        c.display()
                    });
                    publish(snapshot);
                })
            });
            c.display()
        });
        clear_input();
        publish(snapshot);
        // the input is enabled once the snapshot has been applied
        request_animation_frame(move || {
            if let Some(input) = input_ref.get_untracked() {
                let _ = input.focus();
            }
        });
    };

    let reset_test = move || {
        let snapshot = with_controller(|c| {
            c.reset();
            c.display()
        });
        clear_input();
        publish(snapshot);
    };

    let save_result = move || {
        let mut store = LocalStore::open();
        let mut leaderboard = store.leaderboard();
        let Some(saved) = with_controller(|c| c.save_result(&mut leaderboard)) else {
            return;
        };
        if let Err(err) = leaderboard.persist(&mut store) {
            browser::error(&format!("Could not save result: {err}"));
            return;
        }
        set_board.set(board_rows(&leaderboard));
        mirror::mirror_result(saved);
        browser::alert("Result saved successfully!");
    };

    let final_field = move |field: fn(&ResultRecord) -> String| {
        move || display.with(|d| d.results.as_ref().map(field).unwrap_or_default())
    };

    view! {
        <div class="container">
            <h1>"Typing Speed Test"</h1>

            <div class="controls">
                <select
                    id="time-select"
                    prop:disabled=move || !display.with(|d| d.controls_enabled)
                    on:change=move |ev| {
                        if let Ok(secs) = event_target_value(&ev).parse::<u32>() {
                            let snapshot = with_controller(|c| {
                                c.set_duration(secs);
                                c.display()
                            });
                            publish(snapshot);
                        }
                    }
                >
                    {DURATION_CHOICES
                        .iter()
                        .map(|secs| {
                            view! {
                                <option value={secs.to_string()} selected={*secs == DEFAULT_DURATION_SECS}>
                                    {format!("{secs} seconds")}
                                </option>
                            }
                        })
                        .collect_view()}
                </select>
                <button
                    id="start-btn"
                    prop:disabled=move || !display.with(|d| d.controls_enabled)
                    on:click=move |_| start_test()
                >
                    "Start Test"
                </button>
                <button id="reset-btn" on:click=move |_| reset_test()>
                    "Reset"
                </button>
            </div>

            <div class="stats">
                <div class="stat">
                    <span id="time">{move || format!("{}s", display.with(|d| d.time_left))}</span>
                    <span class="label">"Time"</span>
                </div>
                <div class="stat">
                    <span id="wpm">{move || display.with(|d| d.wpm)}</span>
                    <span class="label">"WPM"</span>
                </div>
                <div class="stat">
                    <span id="accuracy">{move || format!("{}%", display.with(|d| d.accuracy))}</span>
                    <span class="label">"Accuracy"</span>
                </div>
            </div>

            <div id="text-display" class="text-display">
                {move || match display.with(|d| d.text.clone()) {
                    TextView::Placeholder(prompt) => prompt.into_any(),
                    TextView::Cells(cells) => cells
                        .into_iter()
                        .map(|cell| view! { <span class={cell.class.css_class()}>{cell.ch.to_string()}</span> })
                        .collect_view()
                        .into_any(),
                }}
            </div>

            <input
                id="text-input"
                type="text"
                autocomplete="off"
                spellcheck="false"
                placeholder="Start typing here..."
                node_ref=input_ref
                prop:disabled=move || !display.with(|d| d.input_enabled)
                maxlength=move || display.with(|d| d.max_len.map(|n| n.to_string()))
                on:input=move |ev| {
                    let typed = event_target_value(&ev);
                    let snapshot = with_controller(|c| {
                        c.on_input(&typed, now_ms());
                        c.display()
                    });
                    publish(snapshot);
                }
                on:keydown=move |ev: web_sys::KeyboardEvent| {
                    if with_controller(|c| c.on_key(&ev.key())) == KeyDisposition::Suppress {
                        ev.prevent_default();
                    }
                }
            />

            <Show when=move || display.with(|d| d.results.is_some())>
                <div id="results" class="results">
                    <h2>"Test Results"</h2>
                    <div class="result-grid">
                        <div>"WPM: " <span id="final-wpm">{final_field(|r| r.wpm.to_string())}</span></div>
                        <div>"Accuracy: " <span id="final-accuracy">{final_field(|r| format!("{}%", r.accuracy))}</span></div>
                        <div>"CPM: " <span id="final-cpm">{final_field(|r| r.cpm.to_string())}</span></div>
                        <div>"Characters: " <span id="total-chars">{final_field(|r| r.total_chars.to_string())}</span></div>
                    </div>
                    <button id="save-result" on:click=move |_| save_result()>
                        "Save Result"
                    </button>
                </div>
            </Show>

            <div class="leaderboard">
                <h2>"Leaderboard"</h2>
                <div id="leaderboard-list">
                    <Show
                        when=move || !board.with(|rows| rows.is_empty())
                        fallback=|| view! { <p>"No results yet. Complete a test to see your scores!"</p> }
                    >
                        <For
                            each=move || board.get()
                            key=|row| row.clone()
                            children=move |row| {
                                view! {
                                    <div class="leaderboard-item">
                                        <div class="rank">{format!("#{}", row.rank)}</div>
                                        <div class="stats">
                                            <span class="stat">{format!("WPM: {}", row.wpm)}</span>
                                            <span class="stat">{format!("Accuracy: {}%", row.accuracy)}</span>
                                            <span class="stat">{format!("Date: {}", row.date)}</span>
                                        </div>
                                    </div>
                                }
                            }
                        />
                    </Show>
                </div>
            </div>
        </div>
    }
}
