use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::models::view::reply::ReplyView;

/// A rendering group: one top-level reply plus every reply transitively
/// under it, flattened into a single chronological stack. Depth is
/// deliberately collapsed; the only nesting hint a stacked reply keeps is
/// the `reply_to_username` mention of its direct parent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReplyCard {
    pub top: ReplyView,
    pub stacked: Vec<ReplyView>,
}

/// Groups the flat reply list of one thread into ordered cards.
///
/// Guarantees:
/// - every input reply lands in exactly one card, as `top` or in `stacked`;
/// - cards keep the input-relative order of their top reply, the builder
///   never reorders top-level replies;
/// - `stacked` is sorted ascending by `created_at`, ties keep input order.
///
/// A reply whose parent chain ends at an id missing from the input (a child
/// orphaned by a non-cascading delete) is treated as a root and gets its own
/// card. A reply whose chain never terminates (self-parent or a longer
/// cycle) fails closed: after as many hops as there are replies the walk
/// gives up and the reply becomes its own card.
pub fn build_cards(replies: Vec<ReplyView>) -> Vec<ReplyCard> {
    let n = replies.len();
    if n == 0 {
        return vec![];
    }

    let mut root_of: Vec<usize> = Vec::with_capacity(n);
    {
        let index: HashMap<&Thing, usize> = replies
            .iter()
            .enumerate()
            .map(|(ix, r)| (&r.id, ix))
            .collect();

        for ix in 0..n {
            let mut cur = ix;
            let mut hops = 0;
            loop {
                let parent_ix = replies[cur]
                    .parent_reply
                    .as_ref()
                    .and_then(|p| index.get(p).copied());
                match parent_ix {
                    // top-level, or parent not in the set: cur is the root
                    None => break,
                    Some(p_ix) => {
                        hops += 1;
                        if hops > n {
                            // cycle - fall back to the reply itself
                            cur = ix;
                            break;
                        }
                        cur = p_ix;
                    }
                }
            }
            root_of.push(cur);
        }
    }

    let mut cards: Vec<ReplyCard> = Vec::new();
    let mut card_ix_by_root: HashMap<usize, usize> = HashMap::new();
    for ix in 0..n {
        if root_of[ix] == ix {
            card_ix_by_root.insert(ix, cards.len());
            cards.push(ReplyCard {
                top: replies[ix].clone(),
                stacked: vec![],
            });
        }
    }

    let username_by_id: HashMap<&Thing, &str> = replies
        .iter()
        .map(|r| (&r.id, r.username.as_str()))
        .collect();

    for ix in 0..n {
        let root = root_of[ix];
        if root == ix {
            continue;
        }
        let mut stacked = replies[ix].clone();
        stacked.reply_to_username = stacked
            .parent_reply
            .as_ref()
            .and_then(|p| username_by_id.get(p))
            .map(|u| u.to_string());
        let card_ix = card_ix_by_root[&root];
        cards[card_ix].stacked.push(stacked);
    }

    for card in cards.iter_mut() {
        // sort_by is stable, input order survives equal timestamps
        card.stacked.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    }

    cards
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn reply(id: u32, parent: Option<u32>, minute: u32) -> ReplyView {
        ReplyView {
            id: Thing::from(("reply", id.to_string().as_str())),
            username: format!("user{id}"),
            content: format!("content {id}"),
            parent_reply: parent.map(|p| Thing::from(("reply", p.to_string().as_str()))),
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, minute, 0).unwrap(),
            reply_to_username: None,
        }
    }

    fn card_ids(card: &ReplyCard) -> Vec<String> {
        std::iter::once(card.top.id.id.to_raw())
            .chain(card.stacked.iter().map(|r| r.id.id.to_raw()))
            .collect()
    }

    #[test]
    fn empty_input_yields_no_cards() {
        assert!(build_cards(vec![]).is_empty());
    }

    #[test]
    fn every_reply_lands_in_exactly_one_card() {
        let input = vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(2), 2),
            reply(4, None, 3),
            reply(5, Some(4), 4),
            reply(6, Some(1), 5),
        ];
        let cards = build_cards(input);

        let mut seen: Vec<String> = cards.iter().flat_map(|c| card_ids(c)).collect();
        seen.sort();
        assert_eq!(seen, vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[test]
    fn deep_descendants_group_under_their_top_level_ancestor() {
        let input = vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(2), 2),
            reply(4, Some(3), 3),
        ];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 1);
        assert_eq!(card_ids(&cards[0]), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn cards_keep_input_order_of_top_replies() {
        let input = vec![
            reply(7, None, 5),
            reply(2, None, 1),
            reply(9, Some(2), 6),
            reply(5, None, 0),
        ];
        let cards = build_cards(input);

        let tops: Vec<String> = cards.iter().map(|c| c.top.id.id.to_raw()).collect();
        assert_eq!(tops, vec!["7", "2", "5"]);
    }

    #[test]
    fn orphaned_reply_becomes_its_own_card() {
        // parent 99 was deleted without cascading
        let input = vec![reply(1, None, 0), reply(2, Some(99), 1), reply(3, Some(2), 2)];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 2);
        assert_eq!(card_ids(&cards[0]), vec!["1"]);
        // the orphan roots its own subtree
        assert_eq!(card_ids(&cards[1]), vec!["2", "3"]);
    }

    #[test]
    fn cycle_terminates_and_falls_back_to_top_level() {
        let a = reply(1, Some(2), 0);
        let b = reply(2, Some(1), 1);
        let cards = build_cards(vec![a, b]);

        assert_eq!(cards.len(), 2);
        assert_eq!(card_ids(&cards[0]), vec!["1"]);
        assert_eq!(card_ids(&cards[1]), vec!["2"]);
    }

    #[test]
    fn child_of_cycle_roots_its_own_card() {
        // 3 points into the 1<->2 cycle, so its walk never finds a root either
        let input = vec![reply(1, Some(2), 0), reply(2, Some(1), 1), reply(3, Some(2), 2)];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 3);
        assert_eq!(card_ids(&cards[0]), vec!["1"]);
        assert_eq!(card_ids(&cards[1]), vec!["2"]);
        assert_eq!(card_ids(&cards[2]), vec!["3"]);
    }

    #[test]
    fn self_parent_terminates() {
        let cards = build_cards(vec![reply(1, Some(1), 0), reply(2, None, 1)]);

        assert_eq!(cards.len(), 2);
        assert_eq!(card_ids(&cards[0]), vec!["1"]);
        assert_eq!(card_ids(&cards[1]), vec!["2"]);
    }

    #[test]
    fn stacked_replies_are_chronological() {
        let input = vec![
            reply(1, None, 0),
            reply(2, Some(1), 9),
            reply(3, Some(1), 2),
            reply(4, Some(3), 5),
        ];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 1);
        let stacked: Vec<String> = cards[0].stacked.iter().map(|r| r.id.id.to_raw()).collect();
        assert_eq!(stacked, vec!["3", "4", "2"]);
        for pair in cards[0].stacked.windows(2) {
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let input = vec![
            reply(1, None, 0),
            reply(4, Some(1), 3),
            reply(2, Some(1), 3),
            reply(3, Some(1), 3),
        ];
        let cards = build_cards(input);

        let stacked: Vec<String> = cards[0].stacked.iter().map(|r| r.id.id.to_raw()).collect();
        assert_eq!(stacked, vec!["4", "2", "3"]);
    }

    #[test]
    fn mention_label_comes_from_direct_parent() {
        let input = vec![
            reply(1, None, 0),
            reply(2, Some(1), 1),
            reply(3, Some(2), 2),
        ];
        let cards = build_cards(input);

        let stacked = &cards[0].stacked;
        assert_eq!(stacked[0].reply_to_username.as_deref(), Some("user1"));
        assert_eq!(stacked[1].reply_to_username.as_deref(), Some("user2"));
    }

    #[test]
    fn no_mention_label_for_missing_direct_parent() {
        // 2's parent is gone; 3 still mentions 2
        let input = vec![reply(2, Some(99), 0), reply(3, Some(2), 1)];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].top.reply_to_username, None);
        assert_eq!(cards[0].stacked[0].reply_to_username.as_deref(), Some("user2"));
    }

    #[test]
    fn stacks_two_cards_end_to_end() {
        // two conversations: 1 <- 2 <- 3 (3 written before 2), and a lone 4
        let input = vec![
            reply(1, None, 0),
            reply(2, Some(1), 2),
            reply(3, Some(2), 1),
            reply(4, None, 3),
        ];
        let cards = build_cards(input);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].top.id.id.to_raw(), "1");
        let stacked: Vec<String> = cards[0].stacked.iter().map(|r| r.id.id.to_raw()).collect();
        assert_eq!(stacked, vec!["3", "2"]);
        assert_eq!(cards[1].top.id.id.to_raw(), "4");
        assert!(cards[1].stacked.is_empty());
    }
}
