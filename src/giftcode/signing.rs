/// Request signing for the gift-code API.
///
/// The API authenticates form bodies with a keyed hash: sort the payload
/// keys, join them as `key=value` pairs with `&`, append the shared secret
/// and attach the MD5 of that string as a `sign` field.
use crate::constants::WOS_SIGNING_SECRET;

/// Sign a payload for the gift-code API.
///
/// Returns the original fields plus the `sign` field, ready to post as a
/// form body. Insertion order of `fields` never affects the signature.
pub fn sign_payload(fields: &[(&str, String)]) -> Vec<(String, String)> {
    let mut sorted: Vec<_> = fields.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let canonical = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let digest = md5::compute(format!("{}{}", canonical, WOS_SIGNING_SECRET));
    let sign = format!("{:x}", digest);

    let mut signed = Vec::with_capacity(fields.len() + 1);
    signed.push(("sign".to_string(), sign));
    for (key, value) in fields {
        signed.push((key.to_string(), value.clone()));
    }
    signed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_of(signed: &[(String, String)]) -> &str {
        &signed
            .iter()
            .find(|(key, _)| key == "sign")
            .expect("sign field present")
            .1
    }

    #[test]
    fn test_sign_is_deterministic() {
        let fields = [
            ("fid", "12345".to_string()),
            ("time", "1700000000".to_string()),
        ];
        let a = sign_payload(&fields);
        let b = sign_payload(&fields);
        assert_eq!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn test_sign_ignores_insertion_order() {
        let forward = sign_payload(&[
            ("fid", "12345".to_string()),
            ("time", "1700000000".to_string()),
            ("init", "0".to_string()),
        ]);
        let backward = sign_payload(&[
            ("init", "0".to_string()),
            ("time", "1700000000".to_string()),
            ("fid", "12345".to_string()),
        ]);
        assert_eq!(signature_of(&forward), signature_of(&backward));
    }

    #[test]
    fn test_sign_depends_on_values() {
        let a = sign_payload(&[("fid", "1".to_string())]);
        let b = sign_payload(&[("fid", "2".to_string())]);
        assert_ne!(signature_of(&a), signature_of(&b));
    }

    #[test]
    fn test_signed_payload_keeps_original_fields() {
        let signed = sign_payload(&[("fid", "12345".to_string()), ("cdk", "CODE".to_string())]);
        assert_eq!(signed.len(), 3);
        assert!(signed.iter().any(|(k, v)| k == "fid" && v == "12345"));
        assert!(signed.iter().any(|(k, v)| k == "cdk" && v == "CODE"));
    }

    #[test]
    fn test_signature_is_lowercase_hex_md5() {
        let signed = sign_payload(&[("fid", "12345".to_string())]);
        let sign = signature_of(&signed);
        assert_eq!(sign.len(), 32);
        assert!(sign.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
