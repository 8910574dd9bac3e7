use std::borrow::Cow;

/// Removes `emulation_prevention_three_byte`s from a NAL unit payload.
///
/// Every `00 00 03` sequence loses its `03`. Borrows when there is nothing to strip.
///
/// ISO/IEC 23008-2 - 7.3.1.1
pub fn nal_to_rbsp(payload: &[u8]) -> Cow<'_, [u8]> {
    if !payload.windows(3).any(|w| w == [0, 0, 3]) {
        return Cow::Borrowed(payload);
    }

    let mut rbsp = Vec::with_capacity(payload.len());
    let mut zeros = 0;
    for &byte in payload {
        if zeros >= 2 && byte == 3 {
            zeros = 0;
            continue;
        }

        zeros = if byte == 0 { zeros + 1 } else { 0 };
        rbsp.push(byte);
    }

    Cow::Owned(rbsp)
}

/// Inserts `emulation_prevention_three_byte`s so the payload never contains
/// `00 00 00`, `00 00 01`, `00 00 02` or `00 00 03`.
pub fn rbsp_to_nal(rbsp: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(rbsp.len() + rbsp.len() / 2);
    let mut zeros = 0;
    for &byte in rbsp {
        if zeros >= 2 && byte <= 3 {
            payload.push(3);
            zeros = 0;
        }

        zeros = if byte == 0 { zeros + 1 } else { 0 };
        payload.push(byte);
    }

    payload
}

/// Returns `true` while `rest` still holds syntax elements, i.e. it is neither
/// empty nor just the `rbsp_trailing_bits` byte.
///
/// ISO/IEC 23008-2 - 7.2
pub(crate) fn more_rbsp_data(rest: &[u8]) -> bool {
    !(rest.is_empty() || rest == [0x80])
}
