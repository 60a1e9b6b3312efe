pub mod ref_name;

/// Names a ref may not take: leading dots or slashes, `..`, `.lock` suffixes, `@{`, control and
/// glob characters
pub const INVALID_REF_NAME_REGEX: &str =
    r"^\.|\/\.|\.\.|^\/|\/$|\/\/|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
