/// `Flags` holds the three condition bits the engine updates after every
/// flag-setting operation: `Z`ero, `S`ign, `O`verflow.
///
/// Not packed into a status byte — StartASM has no instruction that
/// reads/writes the flags as a value, only `jump` that branches on them —
/// so three plain bits are enough.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    z: bool,
    s: bool,
    o: bool,
}

/// Names one of the three condition bits, rather than letting callers poke
/// at `Flags`' fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Zero,
    Sign,
    Overflow,
}

impl Flags {
    pub fn get(&self, flag: Flag) -> bool {
        match flag {
            Flag::Zero => self.z,
            Flag::Sign => self.s,
            Flag::Overflow => self.o,
        }
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        match flag {
            Flag::Zero => self.z = value,
            Flag::Sign => self.s = value,
            Flag::Overflow => self.o = value,
        }
    }

    /// Apply the shared flag-update rule for a wrapped result.
    /// `overflow` is the infinite-precision overflow test; callers that
    /// never overflow (bitwise ops, `not`) pass `Some(false)`. `CHARACTER`
    /// results pass `None`: per spec §4.2 rule 1, overflow is untouched by
    /// a `CHARACTER` wrap, so `O` must keep whatever a prior flag-setting
    /// op left it at rather than being forced to `false`.
    pub fn update(&mut self, wrapped: i64, overflow: Option<bool>) {
        if let Some(overflow) = overflow {
            self.set(Flag::Overflow, overflow);
        }
        if wrapped == 0 {
            self.set(Flag::Zero, true);
            self.set(Flag::Sign, false);
        } else if wrapped < 0 {
            self.set(Flag::Zero, false);
            self.set(Flag::Sign, true);
        } else {
            self.set(Flag::Zero, false);
            self.set(Flag::Sign, false);
        }
    }

    /// Render as `zf:0|1 sf:0|1 of:0|1`.
    pub fn dump(&self) -> String {
        format!("zf:{} sf:{} of:{}", self.z as u8, self.s as u8, self.o as u8)
    }
}
