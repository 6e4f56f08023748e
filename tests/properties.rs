use proptest::prelude::*;

use repobrief::core::checklist::{Checklist, rewrite_completion};
use repobrief::core::ignore_rules::{RuleSet, RuleSource};
use repobrief::core::markdown::StructuredDocument;
use std::path::Path;

fn rules(lines: &[String]) -> RuleSet {
    RuleSet::compile(
        Path::new("/repo"),
        &[RuleSource::optional("/repo/.gitignore", Some(lines.join("\n")))],
    )
    .unwrap()
}

fn segment() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,7}"
}

fn rel_path() -> impl Strategy<Value = String> {
    prop::collection::vec(segment(), 1..4).prop_map(|parts| parts.join("/"))
}

fn task_line() -> impl Strategy<Value = String> {
    (prop_oneof![Just('-'), Just('*')], any::<bool>(), "[a-z ]{1,16}[a-z]").prop_map(
        |(bullet, done, desc)| format!("{bullet} [{}] {desc}", if done { 'x' } else { ' ' }),
    )
}

proptest! {
    #[test]
    fn no_rules_ignore_nothing(path in rel_path()) {
        let r = rules(&[]);
        prop_assert!(!r.is_ignored(&path));
    }

    #[test]
    fn last_matching_rule_wins(name in segment()) {
        let neg = format!("!{name}");

        let reincluded = rules(&[name.clone(), neg.clone()]);
        prop_assert!(!reincluded.is_ignored(&name));

        let excluded = rules(&[neg, name.clone()]);
        prop_assert!(excluded.is_ignored(&name));
    }

    #[test]
    fn directory_rule_covers_descendants(dir in segment(), rest in rel_path()) {
        let r = rules(&[format!("{dir}/")]);
        let nested = format!("{dir}/{rest}");
        prop_assert!(r.is_ignored(&nested));
        let dotted = format!("./{nested}");
        prop_assert!(r.is_ignored(&dotted));
    }

    #[test]
    fn parsers_accept_arbitrary_text(text in "\\PC{0,200}") {
        let list = Checklist::parse(&text);
        prop_assert!(list.completed_count() <= list.tasks.len());

        let doc = StructuredDocument::parse(&text);
        prop_assert!(doc.sections.iter().all(|s| !s.content.is_empty()));
    }

    #[test]
    fn rewrite_is_idempotent_and_local(
        lines in prop::collection::vec(task_line(), 1..12),
        pick in any::<prop::sample::Index>(),
        completed in any::<bool>(),
    ) {
        let text = lines.join("\n") + "\n";
        let target = pick.get(&lines);
        // Description part after "- [ ] "
        let needle = &target[6..];

        let (once, matched) = rewrite_completion(&text, needle, completed);
        prop_assert!(matched >= 1);

        let (twice, _) = rewrite_completion(&once, needle, completed);
        prop_assert_eq!(&once, &twice);

        for (before, after) in text.split('\n').zip(once.split('\n')) {
            if before.contains(needle) {
                prop_assert_eq!(after.as_bytes()[3] == b'x', completed);
            } else {
                prop_assert_eq!(before, after);
            }
        }
    }
}
