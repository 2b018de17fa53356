use anyhow::Result;

/// Parse a raw header block into `(name, value)` pairs.
///
/// Values come back unfolded with RFC 2047 encoded-words decoded.
pub fn header_pairs(raw: &[u8]) -> Result<Vec<(String, String)>> {
    let (headers, _idx) = mailparse::parse_headers(raw)?;
    Ok(headers
        .iter()
        .map(|h| (h.get_key(), h.get_value()))
        .collect())
}
