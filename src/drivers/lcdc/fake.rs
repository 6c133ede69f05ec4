// Recording controller for host tests.
// Acknowledges enable/disable requests on the next status read (scan-out
// acknowledges by clearing), reports SYNC_BUSY / ATTR_BUSY for
// `busy_reads` reads after every register write, and logs every call.

use std::collections::HashMap;
use std::vec::Vec;

use super::{Axis, DisplayController, Layer, Reg, RegisterMap, Signals, clut_word};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Write(Reg, u32),
    Enable(Signals),
    Disable(Signals),
    Clut(Layer, Vec<u32>),
    Coefficients(Axis, Vec<u32>),
}

pub struct FakeLcdc {
    map: &'static RegisterMap,
    pub ops: Vec<Op>,
    pub regs: HashMap<Reg, u32>,
    pub status: Signals,
    /// never acknowledged
    pub stuck: Signals,
    pub busy_reads: u32,
    busy_left: u32,
    pub reads: u32,
}

impl FakeLcdc {
    pub fn new(map: &'static RegisterMap) -> Self {
        Self {
            map,
            ops: Vec::new(),
            regs: HashMap::new(),
            // idle scan-out reads as set
            status: Signals::SCAN,
            stuck: Signals::empty(),
            busy_reads: 0,
            busy_left: 0,
            reads: 0,
        }
    }

    pub fn writes(&self) -> Vec<(Reg, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(r, v) => Some((*r, *v)),
                _ => None,
            })
            .collect()
    }

    pub fn written(&self, reg: Reg) -> Option<u32> {
        self.writes()
            .into_iter()
            .rev()
            .find(|(r, _)| *r == reg)
            .map(|(_, v)| v)
    }

    pub fn position(&self, op: &Op) -> Option<usize> {
        self.ops.iter().position(|o| o == op)
    }

    /// Enable/disable requests in order.
    pub fn signal_ops(&self) -> Vec<Op> {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Enable(_) | Op::Disable(_)))
            .cloned()
            .collect()
    }

    fn apply(&mut self, signals: Signals, on: bool) {
        for bit in signals.iter() {
            if self.stuck.contains(bit) {
                continue;
            }
            // scan-out status is active-low
            let set = if bit == Signals::SCAN { !on } else { on };
            self.status.set(bit, set);
        }
    }
}

impl DisplayController for FakeLcdc {
    fn map(&self) -> &'static RegisterMap {
        self.map
    }

    fn write_config(&mut self, reg: Reg, value: u32) {
        self.ops.push(Op::Write(reg, value));
        self.regs.insert(reg, value);
        self.busy_left = self.busy_reads;
    }

    fn read_config(&mut self, reg: Reg) -> u32 {
        self.regs.get(&reg).copied().unwrap_or(0)
    }

    fn read_status(&mut self) -> Signals {
        self.reads += 1;
        let mut s = self.status;
        if self.busy_left > 0 {
            self.busy_left -= 1;
            s |= Signals::SYNC_BUSY | Signals::ATTR_BUSY;
        }
        s
    }

    fn enable(&mut self, signals: Signals) {
        self.ops.push(Op::Enable(signals));
        self.apply(signals, true);
        self.busy_left = self.busy_reads;
    }

    fn disable(&mut self, signals: Signals) {
        self.ops.push(Op::Disable(signals));
        self.apply(signals, false);
        self.busy_left = self.busy_reads;
    }

    fn set_clut(&mut self, layer: Layer, palette: &[u8]) {
        let words = palette.chunks_exact(4).map(clut_word).collect();
        self.ops.push(Op::Clut(layer, words));
    }

    fn set_scaler_coefficients(&mut self, axis: Axis, table: &[u32]) {
        self.ops.push(Op::Coefficients(axis, table.to_vec()));
    }
}
