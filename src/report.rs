//! Human-readable rendering of an [`ArchiveModel`].
//!
//! This is the only place where filenames and comments are turned into
//! text. Flag bit 11 selects UTF-8, anything else is read as IBM code
//! page 437.

use std::borrow::Cow;
use std::fmt::{self, Write};

use crate::zip::{
    ArchiveModel, CentralDirectoryHeader, WalkFailure, ZippedFileEntry, dos_date, dos_time,
};

/// Code page 437, bytes 0x80 to 0xFF.
const CP437_HIGH: &str = "ÇüéâäàåçêëèïîìÄÅÉæÆôöòûùÿÖÜ¢£¥₧ƒáíóúñÑªº¿⌐¬½¼¡«»\
░▒▓│┤╡╢╖╕╣║╗╝╜╛┐└┴┬├─┼╞╟╚╔╩╦╠═╬╧╨╤╥╙╘╒╓╫╪┘┌█▄▌▐▀\
αßΓπΣσµτΦΘΩδ∞φε∩≡±≥≤⌠⌡÷≈°∙·√ⁿ²■\u{a0}";

fn cp437_char(byte: u8) -> char {
    if byte < 0x80 {
        return byte as char;
    }
    CP437_HIGH
        .chars()
        .nth((byte - 0x80) as usize)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Decode a raw filename or comment for display.
pub fn decode_text(bytes: &[u8], utf8: bool) -> Cow<'_, str> {
    if utf8 {
        return String::from_utf8_lossy(bytes);
    }
    if bytes.is_ascii() {
        // ASCII is identical in both encodings
        return String::from_utf8_lossy(bytes);
    }
    Cow::Owned(bytes.iter().copied().map(cp437_char).collect())
}

/// Format raw MS-DOS date and time fields.
pub fn format_dos_datetime(date: u16, time: u16) -> String {
    let (year, month, day) = dos_date(date);
    let (hour, minute, second) = dos_time(time);
    format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}")
}

fn entry_line(out: &mut String, entry: &ZippedFileEntry<'_>) -> fmt::Result {
    let header = &entry.header;
    let (compressed, uncompressed) = entry.effective_sizes();
    let mut flags = Vec::new();
    if header.encrypted {
        flags.push("encrypted".to_string());
    }
    if let Some(option) = header.compression_option {
        flags.push(option.name().to_lowercase());
    }
    if entry.descriptor.is_some() {
        flags.push("data descriptor".to_string());
    }

    writeln!(
        out,
        "{:#010x}  {:>10}  {:>10}  {:<8}  {}  {:08x}  {}{}",
        entry.offset,
        uncompressed,
        compressed,
        header.compression_method.name(),
        format_dos_datetime(header.last_mod_date, header.last_mod_time),
        entry.effective_crc32(),
        decode_text(&header.file_name, header.utf8_names()),
        if flags.is_empty() {
            String::new()
        } else {
            format!("  [{}]", flags.join(", "))
        }
    )
}

fn central_line(
    out: &mut String,
    model: &ArchiveModel<'_>,
    header: &CentralDirectoryHeader,
) -> fmt::Result {
    let mut notes = Vec::new();
    if header.is_directory() {
        notes.push("directory");
    }
    if model.entry_for(header).is_none() {
        notes.push("no local header at this offset");
    }

    writeln!(
        out,
        "central  -> {:#010x}  {}{}",
        header.local_header_offset,
        decode_text(&header.file_name, header.utf8_names()),
        if notes.is_empty() {
            String::new()
        } else {
            format!("  [{}]", notes.join(", "))
        }
    )
}

fn write_report(
    out: &mut String,
    name: &str,
    model: &ArchiveModel<'_>,
    verbose: bool,
) -> fmt::Result {
    writeln!(out, "Archive: {name}")?;

    if verbose {
        let rule = "-".repeat(88);
        writeln!(
            out,
            "{:>10}  {:>10}  {:>10}  {:<8}  {:<19}  {:<8}  Name",
            "Offset", "Length", "Size", "Method", "Modified", "CRC-32"
        )?;
        writeln!(out, "{rule}")?;
        for entry in &model.entries {
            entry_line(out, entry)?;
        }
        if !model.central_directory.is_empty() {
            writeln!(out, "{rule}")?;
            for header in &model.central_directory {
                central_line(out, model, header)?;
            }
        }
        writeln!(out, "{rule}")?;
    }

    writeln!(out, "  local entries:       {}", model.entries.len())?;
    writeln!(out, "  encrypted entries:   {}", model.encrypted_entries())?;
    writeln!(out, "  central directory:   {}", model.central_directory.len())?;
    match &model.end_record {
        Some(end) => {
            writeln!(
                out,
                "  end record:          {} entries, directory at {:#x} ({} bytes)",
                end.total_entries, end.cd_offset, end.cd_size
            )?;
            if !end.comment.is_empty() {
                writeln!(out, "  comment:             {}", decode_text(&end.comment, false))?;
            }
        }
        None => writeln!(out, "  end record:          missing")?,
    }
    for anomaly in &model.anomalies {
        writeln!(out, "  anomaly:             {anomaly}")?;
    }
    match model.overlay_length {
        Some(0) => writeln!(out, "  overlay:             none"),
        Some(len) => writeln!(out, "  overlay:             {len} bytes"),
        None => writeln!(out, "  overlay:             unknown"),
    }
}

/// Render a successful walk.
///
/// The summary is always included; `verbose` adds one line per local entry
/// and central directory header.
pub fn render(name: &str, model: &ArchiveModel<'_>, verbose: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_report(&mut out, name, model, verbose);
    out
}

/// Render an abandoned walk together with what was parsed before it.
pub fn render_failure(name: &str, failure: &WalkFailure<'_>, verbose: bool) -> String {
    let mut out = String::new();
    let _ = write_report(&mut out, name, &failure.partial, verbose)
        .and_then(|()| writeln!(out, "  error:               {}", failure.error));
    out
}
