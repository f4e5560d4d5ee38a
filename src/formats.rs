//! Output format id to file extension mapping.
//!
//! 3Play addresses export formats by numeric id (`output_format_id`). The
//! service's catalog is fixed, so the mapping lives here as a static table
//! rather than being fetched per call.

/// Returns the file extension for an output format id.
///
/// Total over all inputs: ids outside the known table map to `txt`. Several
/// ids share an extension (e.g. the WebVTT variants 51, 138, and 139).
pub fn extension_for(format_id: i64) -> &'static str {
    match format_id {
        1 => "dfxp",
        2 => "cptxml",
        3 => "qt",
        4 => "rt",
        5 => "scc",
        6 => "stl",
        7 | 116 => "srt",
        8 => "adbe",
        9 => "smi",
        15 => "cloud",
        16 => "txt",
        17 => "doc",
        18 | 127 => "stampeddoc",
        19 => "tpm",
        20 | 136 => "html",
        28 => "js",
        29 | 162 => "json",
        33 => "sbv",
        43 | 91 | 98 => "xml",
        46 => "pdf",
        48 => "wmp",
        51 | 138 | 139 => "vtt",
        53 => "avidds",
        70 => "iscc",
        71 => "smptett",
        72 => "pptxml",
        89 => "rtf",
        93 => "tt",
        95 => "qtxml",
        126 => "itt",
        158 => "docx",
        _ => "txt",
    }
}
