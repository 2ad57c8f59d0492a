use std::sync::atomic::{AtomicBool, Ordering};

use nom::{be_u32, be_u8};

static LIST_MODE: AtomicBool = AtomicBool::new(false);
static MPI_PRINT_MODE: AtomicBool = AtomicBool::new(false);

/// Enable or disable the packet listing diagnostics.
///
/// When enabled, every parsed packet emits a `:xxx packet:` description
/// through the `log` facade (target `pgp_parse::list`), so the output goes
/// wherever the installed logger routes it. Returns the previous setting.
pub fn set_packet_list_mode(mode: bool) -> bool {
    LIST_MODE.swap(mode, Ordering::Relaxed)
}

/// Controls whether listed MPIs include a full hex dump of their value or
/// only their bit length. Returns the previous setting.
pub fn set_mpi_print_mode(mode: bool) -> bool {
    MPI_PRINT_MODE.swap(mode, Ordering::Relaxed)
}

pub(crate) fn list_mode() -> bool {
    LIST_MODE.load(Ordering::Relaxed)
}

pub(crate) fn mpi_print_mode() -> bool {
    MPI_PRINT_MODE.load(Ordering::Relaxed)
}

macro_rules! list_line {
    ($($arg:tt)*) => {
        if $crate::util::list_mode() {
            info!(target: "pgp_parse::list", $($arg)*);
        }
    };
}

#[inline]
pub fn u32_as_usize(a: u32) -> usize {
    a as usize
}

// Parses the length prefix used inside signature subpacket areas
// (1, 2 or 5 octets).
// Ref: https://tools.ietf.org/html/rfc4880.html#section-5.2.3.1
#[rustfmt::skip]
named!(pub packet_length<usize>, do_parse!(
       olen: be_u8
    >>  len: switch!(value!(olen),
        // One-Octet Lengths
        0..=191   => value!(olen as usize) |
        // Two-Octet Lengths
        192..=254 => map!(be_u8, |a| ((olen as usize - 192) << 8) + 192 + a as usize) |
        // Five-Octet Lengths
        255       => map!(be_u32, u32_as_usize)
    )
    >> (len)
));

pub fn read_string_lossy(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_string()
}

/// Renders bytes for listing output: printable ASCII stays as is,
/// everything else becomes `\xNN`.
pub(crate) fn escape_for_list(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        if b >= b' ' && b <= b'z' {
            out.push(b as char);
        } else {
            out.push_str(&format!("\\x{:02x}", b));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_length_one_octet() {
        assert_eq!(packet_length(&[0][..]).unwrap().1, 0);
        assert_eq!(packet_length(&[42][..]).unwrap().1, 42);
        assert_eq!(packet_length(&[191][..]).unwrap().1, 191);
    }

    #[test]
    fn test_packet_length_two_octets() {
        assert_eq!(packet_length(&[192, 0][..]).unwrap().1, 192);
        assert_eq!(packet_length(&[193, 1][..]).unwrap().1, 449);
        assert_eq!(packet_length(&[254, 255][..]).unwrap().1, 16319);
    }

    #[test]
    fn test_packet_length_five_octets() {
        assert_eq!(
            packet_length(&[255, 0, 1, 0, 0][..]).unwrap().1,
            65536
        );
    }

    #[test]
    fn test_escape_for_list() {
        assert_eq!(escape_for_list(b"abc"), "abc");
        assert_eq!(escape_for_list(&[0x01, b'x']), "\\x01x");
    }
}
