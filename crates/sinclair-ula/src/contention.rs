//! Memory and I/O contention.
//!
//! While the ULA fetches the screen (lines 0-191, T-states 0-127 of the
//! line) it holds the CPU off contended memory ($4000-$7FFF) and the even
//! port. The delay depends on where in the 8 T-state fetch group the CPU
//! access lands: 6, 5, 4, 3, 2, 1, 0, 0.
//!
//! Lines and T-states here are the ULA's: line 0 is the first screen line
//! and T-state 0 fetches the first screen byte of the line.

use crate::timing::SCREEN_LINES;

pub const CONTENTION_PATTERN: [u8; 8] = [6, 5, 4, 3, 2, 1, 0, 0];

/// End of the fetch part of a line.
pub const CONTENTION_END_T_STATE: u16 = 128;

/// The ULA is fetching screen data at this position.
#[must_use]
pub fn in_contention_area(line: u16, t_state: u16) -> bool {
    line < SCREEN_LINES && t_state < CONTENTION_END_T_STATE
}

/// Delay for an access that hits the ULA `offset` T-states into the line.
#[must_use]
pub fn delay_at(offset: i16) -> u8 {
    match usize::try_from(offset) {
        Ok(t) if t < usize::from(CONTENTION_END_T_STATE) => CONTENTION_PATTERN[t % 8],
        _ => 0,
    }
}

/// Delay for a memory access issued at `t_state`.
#[must_use]
pub fn contention(line: u16, t_state: u16, contended: bool) -> u8 {
    if !contended || !in_contention_area(line, t_state) {
        return 0;
    }
    // the access reaches the bus at T2 of the M-cycle
    delay_at(t_state as i16 - 2)
}

/// Total delay for a 4 T-state I/O cycle issued at `t_state`.
///
/// | High byte $40-$7F | Even port | Pattern        |
/// |-------------------|-----------|----------------|
/// | no                | no        | N:4            |
/// | no                | yes       | N:1, C:3       |
/// | yes               | yes       | C:1, C:3       |
/// | yes               | no        | C:1 x 4        |
#[must_use]
pub fn io_contention(line: u16, t_state: u16, ula_port: bool, contended_high: bool) -> u8 {
    if !in_contention_area(line, t_state) {
        return 0;
    }
    let base = t_state as i16 - 1;

    match (contended_high, ula_port) {
        (false, false) => 0,
        (false, true) => delay_at(base + 1),
        (true, true) => {
            let d0 = delay_at(base);
            d0 + delay_at(base + 1 + i16::from(d0))
        }
        (true, false) => {
            let mut total = 0u8;
            for step in 0..4 {
                total += delay_at(base + step + i16::from(total));
            }
            total
        }
    }
}
