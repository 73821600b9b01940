use crate::store::types::{ArrayEntry, ChatPair, MemoryStrand, ProjectArray, SummaryRevision};
use anyhow::Context;
use chrono::{DateTime, Utc};

pub(super) fn encode_entry(entry: &ArrayEntry) -> anyhow::Result<String> {
    let encoded = match entry {
        ArrayEntry::MemoryStrand(strand) => serde_json::to_string(strand),
        ArrayEntry::Summary(revision) => serde_json::to_string(revision),
        ArrayEntry::Chat(pair) => serde_json::to_string(pair),
    };
    encoded.with_context(|| format!("encode {} entry", entry.field().as_str()))
}

pub(super) fn parse_field(raw: &str) -> Option<ProjectArray> {
    match raw {
        "memory_strands" => Some(ProjectArray::MemoryStrands),
        "summaries" => Some(ProjectArray::Summaries),
        "chat_history" => Some(ProjectArray::ChatHistory),
        _ => None,
    }
}

pub(super) fn decode_strand(payload: &str) -> anyhow::Result<MemoryStrand> {
    serde_json::from_str(payload).context("decode memory strand")
}

pub(super) fn decode_summary(payload: &str) -> anyhow::Result<SummaryRevision> {
    serde_json::from_str(payload).context("decode summary revision")
}

pub(super) fn decode_chat(payload: &str) -> anyhow::Result<ChatPair> {
    serde_json::from_str(payload).context("decode chat pair")
}

pub(super) fn parse_timestamp(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .with_context(|| format!("invalid timestamp: {raw}"))
}
