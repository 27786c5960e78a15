//! Bilingual (Indonesian ⇄ Traditional Chinese) chat-message normalization
//! and translation pipeline for caregiver/domestic-worker communication.
//!
//! The interesting part is the deterministic normalization engine that runs
//! before the machine-translation call: abbreviation expansion
//! ([`expand`]), colloquial time canonicalization ([`timefmt`]), language
//! direction detection ([`detect`]) and Chinese output polishing
//! ([`polish`]). [`pipeline::MessageResponder`] wires the stages together.

pub mod cache;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod expand;
pub mod lexicon;
pub mod limiter;
pub mod pipeline;
pub mod polish;
pub mod provider;
pub mod sink;
pub mod textutil;
pub mod timefmt;
