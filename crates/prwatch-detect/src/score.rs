/// Counts how many of title, description and transcript contain `product`
/// verbatim. An empty product scores zero.
#[must_use]
pub fn confidence_score(product: &str, title: &str, description: &str, transcript: &str) -> u8 {
    if product.is_empty() {
        return 0;
    }
    [title, description, transcript]
        .iter()
        .map(|field| u8::from(field.contains(product)))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_product_scores_zero() {
        assert_eq!(confidence_score("", "a", "a", "a"), 0);
    }

    #[test]
    fn counts_each_field_once() {
        assert_eq!(
            confidence_score("アイテムY", "アイテムYレビュー", "商品名：アイテムY アイテムY", ""),
            2
        );
    }

    #[test]
    fn all_fields_give_three() {
        assert_eq!(confidence_score("Y", "Y", "xY", "Yz"), 3);
    }

    #[test]
    fn match_is_case_sensitive() {
        assert_eq!(confidence_score("Anker", "anker", "ANKER", "anker"), 0);
    }
}
