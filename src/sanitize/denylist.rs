//! Tracking parameters removed from every unwrapped link.

/// Parameter names stripped when their lower-cased name matches exactly.
pub const DENIED_PARAMS: &[&str] = &[
    "cmp",
    "d_id",
    "ref",
    "source",
    "utm",
    "xtor",
    "ito",
    "ocid",
    "ftag",
    "linkid",
    "cid",
    "smid",
    "smtyp",
    "taid",
    "uniqueid",    // cnet
    "servicetype", // cnet
    "posttype",    // cnet
    "thetime",     // cnet
    "mkevt",
    "siteid",
    "fscl_post",
    "norover",
    "mkrid",
    "mkcid",
    "amdata",
    "hash",
    "cm_sp",
    "tpcc",     // techcrunch
    "cmpid",    // bloomberg
    "reflink",  // wsj
    "dcmp",     // skynews
    "sh",       // forbes
    "tag",      // amazon
    "linkcode", // amazon
    "ref_",     // amazon
    "psc",      // amazon
    "th",       // amazon
    "keywords", // amazon
    "sprefix",  // amazon
    "sr",       // amazon
    "qid",      // amazon
    "crid",     // amazon
];

/// Parameter name prefixes stripped on a case-sensitive match.
pub const DENIED_PREFIXES: &[&str] = &[
    "utm_", // google analytics
    "at_",
    "ns_",
    "WT.", // webtrends
];

/// Returns true if `name` is a known tracking parameter.
pub fn is_denied(name: &str) -> bool {
    let lowered = name.to_lowercase();
    DENIED_PARAMS.contains(&lowered.as_str())
        || DENIED_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}
