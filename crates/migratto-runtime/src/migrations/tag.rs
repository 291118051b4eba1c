/// Separator between a migration's tag and its description.
pub const TAG_SEPARATOR: char = '_';

/// The logical identifier of a migration: its filename up to the first `_`.
///
/// Filenames without a separator are rejected when the directory is loaded;
/// for those this returns the whole name.
pub fn tag_of(filename: &str) -> &str {
    filename
        .split_once(TAG_SEPARATOR)
        .map_or(filename, |(tag, _)| tag)
}
