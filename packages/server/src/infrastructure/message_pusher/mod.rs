//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `broadcast`: Room Registry のスナップショットに対してセッションのキューへ配信する実装

pub mod broadcast;

pub use broadcast::BroadcastEngine;
