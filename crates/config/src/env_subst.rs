/// Replace `${ENV_VAR}` placeholders in a raw config string.
///
/// Placeholders naming unset variables are left untouched so the parse
/// error (or downstream validation) points at the original text.
pub fn substitute_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => out.push_str(&value),
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // Unclosed or empty placeholder: emit literally.
                out.push_str(&rest[start..]);
                return out;
            },
        }
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
#[allow(unsafe_code)] // set_var is unsafe in edition 2024; fine in single-threaded tests
mod tests {
    use super::*;

    #[test]
    fn substitutes_known_var() {
        unsafe { std::env::set_var("WAYGATE_TEST_VAR", "hello") };
        assert_eq!(substitute_env("key=${WAYGATE_TEST_VAR}"), "key=hello");
        unsafe { std::env::remove_var("WAYGATE_TEST_VAR") };
    }

    #[test]
    fn leaves_unknown_var() {
        assert_eq!(
            substitute_env("${WAYGATE_NONEXISTENT_XYZ}"),
            "${WAYGATE_NONEXISTENT_XYZ}"
        );
    }

    #[test]
    fn leaves_unclosed_placeholder() {
        assert_eq!(substitute_env("tail ${OOPS"), "tail ${OOPS");
    }

    #[test]
    fn no_placeholders() {
        assert_eq!(substitute_env("plain text"), "plain text");
    }
}
