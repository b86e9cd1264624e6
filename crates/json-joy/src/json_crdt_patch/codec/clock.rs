//! Clock codec: ClockTable, RelativeTimestamp, ClockEncoder, ClockDecoder.
//!
//! Mirrors:
//! - `json-crdt-patch/codec/clock/ClockTable.ts`
//! - `json-crdt-patch/codec/clock/RelativeTimestamp.ts`
//! - `json-crdt-patch/codec/clock/ClockEncoder.ts`
//! - `json-crdt-patch/codec/clock/ClockDecoder.ts`
//!
//! These types are used by codecs to compress session IDs into small integer
//! indices, keeping the wire format compact.

use std::collections::HashMap;

use crate::json_crdt_patch::clock::{ts, ClockVector, Ts};

// ── RelativeTimestamp ─────────────────────────────────────────────────────

/// A timestamp encoded relative to a clock table entry.
///
/// `session_index` is the 1-based index into the clock table (0 is reserved
/// for the system session).  `time_diff` is the difference between the clock's
/// reference time and the encoded timestamp's time.
///
/// Mirrors `RelativeTimestamp` in `RelativeTimestamp.ts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeTimestamp {
    /// 1-based index of the session's clock in the clock table.
    pub session_index: u32,
    /// `clock.time - timestamp.time` (non-negative in correct usage).
    pub time_diff: u64,
}

impl RelativeTimestamp {
    pub fn new(session_index: u32, time_diff: u64) -> Self {
        Self {
            session_index,
            time_diff,
        }
    }
}

// ── ClockTable ────────────────────────────────────────────────────────────

/// A flat ordered table of clock entries used during decoding.
///
/// Maps a 0-based position in `by_idx` to a reference `Ts`.
/// Also provides reverse lookup via `by_sid`.
///
/// Mirrors `ClockTable` in `ClockTable.ts`.
#[derive(Debug, Clone, Default)]
pub struct ClockTable {
    /// Entries in insertion order; position = index used on the wire.
    pub by_idx: Vec<Ts>,
    /// Session-ID → index into `by_idx`.
    pub by_sid: HashMap<u64, usize>,
}

impl ClockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ClockTable from a ClockVector, mirroring `ClockTable.from`.
    ///
    /// The local session is placed at index 0 with `time - 1`; all peers
    /// follow in insertion order.
    pub fn from_clock(clock: &ClockVector) -> Self {
        let mut table = Self::new();
        // Local session: stored at time - 1 (the last *issued* time).
        table.push(Ts::new(clock.sid, clock.time.saturating_sub(1)));
        // Peer sessions.
        for peer_ts in clock.peers.values() {
            table.push(*peer_ts);
        }
        table
    }

    /// Append a clock entry and record its index.
    pub fn push(&mut self, id: Ts) {
        let index = self.by_idx.len();
        self.by_sid.insert(id.sid, index);
        self.by_idx.push(id);
    }

    /// Get the reference timestamp at `index`, or `None` if out of bounds.
    pub fn get_by_index(&self, index: usize) -> Option<Ts> {
        self.by_idx.get(index).copied()
    }

    /// Get the entry for a session ID, or `None` if not present.
    pub fn get_by_sid(&self, sid: u64) -> Option<(usize, Ts)> {
        self.by_sid.get(&sid).map(|&idx| (idx, self.by_idx[idx]))
    }
}

// ── ClockEncoder ──────────────────────────────────────────────────────────

/// Encodes logical timestamps to relative form using a per-session clock table.
///
/// Must be `reset()` with the local clock before encoding any timestamps.
///
/// Mirrors `ClockEncoder` in `ClockEncoder.ts`.
#[derive(Debug, Clone, Default)]
pub struct ClockEncoder {
    /// Map: session_id → (1-based index, reference clock Ts).
    table: HashMap<u64, (u32, Ts)>,
    /// Next index to assign (starts at 1; index 0 is reserved for system).
    next_index: u32,
    /// The local ClockVector at encode time.
    clock: Option<ClockVector>,
}

impl ClockEncoder {
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
            next_index: 1,
            clock: None,
        }
    }

    /// Initialise the encoder for a new document.
    ///
    /// The local session is registered at index 1 with its last-issued time
    /// (`clock.time - 1`).  This matches `ClockEncoder.reset()` upstream.
    pub fn reset(&mut self, clock: &ClockVector) {
        self.table.clear();
        self.next_index = 1;
        // The local session occupies slot 1 at `tick(clock, -1)`.
        // tick(clock, -1) in TS means clock.time - 1.
        let local_ref = Ts::new(clock.sid, clock.time.saturating_sub(1));
        let idx = self.next_index;
        self.next_index += 1;
        self.table.insert(clock.sid, (idx, local_ref));
        self.clock = Some(clock.clone());
    }

    /// Encode a timestamp to a `RelativeTimestamp`.
    ///
    /// Returns an error string if the timestamp is newer than its session's
    /// reference clock (which would indicate a clock going backwards).
    pub fn append(&mut self, stamp: Ts) -> Result<RelativeTimestamp, &'static str> {
        let sid = stamp.sid;
        let time = stamp.time;

        // Look up or lazily create an entry for this session.
        let (idx, ref_ts) = if let Some(entry) = self.table.get(&sid) {
            *entry
        } else {
            // Find this session in the peer map, or fall back to local time.
            let clock = self.clock.as_ref().ok_or("encoder not reset")?;
            let peer_ref = clock
                .peers
                .get(&sid)
                .copied()
                .unwrap_or_else(|| Ts::new(sid, clock.time.saturating_sub(1)));
            let idx = self.next_index;
            self.next_index += 1;
            self.table.insert(sid, (idx, peer_ref));
            (idx, peer_ref)
        };

        // time_diff = ref_ts.time - stamp.time; must be non-negative.
        if time > ref_ts.time {
            return Err("TIME_TRAVEL");
        }
        let time_diff = ref_ts.time - time;
        Ok(RelativeTimestamp::new(idx, time_diff))
    }

    /// Serialise the clock table as a flat `[sid, time, sid, time, ...]` array.
    ///
    /// Entries are sorted by their assigned index so the decoder can rebuild
    /// the table deterministically.  Mirrors `ClockEncoder.toJson()`.
    pub fn to_json(&self) -> Vec<u64> {
        // Collect (index, sid, time) tuples and sort by index.
        let mut entries: Vec<(u32, u64, u64)> = self
            .table
            .iter()
            .map(|(&sid, &(idx, ref_ts))| (idx, sid, ref_ts.time))
            .collect();
        entries.sort_by_key(|(idx, _, _)| *idx);

        let mut out = Vec::with_capacity(entries.len() * 2);
        for (_idx, sid, time) in entries {
            out.push(sid);
            out.push(time);
        }
        out
    }
}

// ── ClockDecoder ──────────────────────────────────────────────────────────

/// Decodes relative timestamps back to absolute logical timestamps.
///
/// Mirrors `ClockDecoder` in `ClockDecoder.ts`.
#[derive(Debug, Clone)]
pub struct ClockDecoder {
    /// 1-based table; index 0 maps to the system session.
    /// `table[i - 1]` gives the reference Ts for session index `i`.
    table: Vec<Ts>,
    /// Reconstructed clock vector.
    pub clock: ClockVector,
}

impl ClockDecoder {
    /// Create a decoder seeded with the primary session.
    ///
    /// `sid` + `time` are the reference timestamp for session index 1.
    /// The reconstructed `clock.time = time + 1` (next available time).
    ///
    /// Mirrors `new ClockDecoder(sid, time)` in the upstream.
    pub fn new(sid: u64, time: u64) -> Self {
        let clock = ClockVector::new(sid, time + 1);
        let mut decoder = Self {
            table: Vec::new(),
            clock,
        };
        decoder.table.push(ts(sid, time));
        decoder
    }

    /// Build a decoder from a flat `[sid, time, ...]` array.
    ///
    /// Mirrors `ClockDecoder.fromArr`.
    pub fn from_arr(arr: &[u64]) -> Option<Self> {
        if arr.len() < 2 {
            return None;
        }
        let mut decoder = Self::new(arr[0], arr[1]);
        let mut i = 2;
        while i + 1 < arr.len() {
            decoder.push_tuple(arr[i], arr[i + 1]);
            i += 2;
        }
        Some(decoder)
    }

    /// Append a peer clock entry.
    ///
    /// Mirrors `ClockDecoder.pushTuple`.
    pub fn push_tuple(&mut self, sid: u64, time: u64) {
        let id = ts(sid, time);
        self.clock.observe(id, 1);
        self.table.push(id);
    }

    /// Decode a `(session_index, time_diff)` pair back to a `Ts`.
    ///
    /// - `session_index == 0` → system session: returns `ts(0, time_diff)`.
    /// - Otherwise: looks up `table[session_index - 1]` and returns
    ///   `ts(clock.sid, clock.time - time_diff)`.
    ///
    /// Returns `None` if `session_index` is out of range.
    ///
    /// Mirrors `ClockDecoder.decodeId`.
    pub fn decode_id(&self, session_index: u32, time_diff: u64) -> Option<Ts> {
        if session_index == 0 {
            return Some(ts(0, time_diff));
        }
        let clock = self.table.get((session_index - 1) as usize)?;
        Some(ts(clock.sid, clock.time - time_diff))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
