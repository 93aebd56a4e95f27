//! Core of the typing test: sample texts, metrics, the test controller and
//! the leaderboard. Nothing here touches the browser or the network.

pub mod controller;
pub mod fsm;
pub mod leaderboard;
pub mod passages;
pub mod protocol;
pub mod session;
pub mod wpm;
