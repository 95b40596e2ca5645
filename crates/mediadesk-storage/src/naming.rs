//! Collision-free file names.

use mediadesk_entity::naming::split_extension;

use crate::roots::StorageRoots;

/// Pick a basename inside `parent` that exists in neither storage root.
///
/// A free name is returned unchanged. Otherwise a trailing numeric `-N`
/// segment of the stem is incremented until the name is free, and a stem
/// without one gets `-1` appended first.
pub async fn suggest_name(roots: &StorageRoots, parent: Option<&str>, basename: &str) -> String {
    let mut candidate = basename.to_string();
    loop {
        if !roots.is_taken(parent, &candidate).await {
            return candidate;
        }

        let (stem, ext) = split_extension(&candidate);
        if let Some((head, mut n)) = numeric_suffix(stem) {
            let head = head.to_string();
            let ext = ext.map(str::to_string);
            loop {
                n += 1;
                let next = join(&format!("{head}-{n}"), ext.as_deref());
                if !roots.is_taken(parent, &next).await {
                    return next;
                }
            }
        }

        candidate = join(&format!("{stem}-1"), ext);
    }
}

/// Split `"report-12"` into `("report", 12)`. Zero and zero-padded
/// suffixes do not count as numeric.
fn numeric_suffix(stem: &str) -> Option<(&str, u64)> {
    let (head, last) = stem.rsplit_once('-')?;
    let n: u64 = last.parse().ok()?;
    (n > 0 && n.to_string() == last).then_some((head, n))
}

fn join(stem: &str, ext: Option<&str>) -> String {
    match ext {
        Some(ext) => format!("{stem}.{ext}"),
        None => stem.to_string(),
    }
}
