//! Property-based tests for directory fingerprints and copying.
//!
//! Random small trees are written to disk and the hasher's invariants are
//! checked against them.

#[cfg(test)]
mod proptest_tests {
    use crate::copy::copy_dir;
    use crate::dirhash::hash_dir;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Relative file path (one or two levels) → contents.
    fn tree_strategy() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
        let name = "[a-z]{1,6}";
        let path = prop_oneof![
            name.prop_map(|n| format!("f_{}", n)),
            (name, name).prop_map(|(d, n)| format!("d_{}/f_{}", d, n)),
        ];
        prop::collection::btree_map(path, prop::collection::vec(any::<u8>(), 0..64), 0..8)
    }

    fn write_tree(root: &Path, tree: &BTreeMap<String, Vec<u8>>) {
        fs::create_dir_all(root).unwrap();
        for (rel, content) in tree {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, content).unwrap();
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Property: the same tree hashes the same wherever it is written
        #[test]
        fn hash_is_path_independent(tree in tree_strategy()) {
            let temp_dir = TempDir::new().unwrap();
            let a = temp_dir.path().join("a");
            let b = temp_dir.path().join("nested/b");
            write_tree(&a, &tree);
            write_tree(&b, &tree);

            prop_assert_eq!(hash_dir(&a, ".git").unwrap(), hash_dir(&b, ".git").unwrap());
        }

        /// Property: a copied tree hashes like its source
        #[test]
        fn copy_round_trips_hash(tree in tree_strategy()) {
            let temp_dir = TempDir::new().unwrap();
            let src = temp_dir.path().join("src");
            let dst = temp_dir.path().join("dst");
            write_tree(&src, &tree);

            copy_dir(&src, &dst, ".git").unwrap();

            prop_assert_eq!(hash_dir(&src, ".git").unwrap(), hash_dir(&dst, ".git").unwrap());
        }

        /// Property: nothing written under the ignored directory is visible
        #[test]
        fn ignored_contents_are_invisible(
            tree in tree_strategy(),
            hidden in prop::collection::vec(any::<u8>(), 0..64),
        ) {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path().join("t");
            write_tree(&root, &tree);
            fs::create_dir_all(root.join(".svn")).unwrap();
            let before = hash_dir(&root, ".svn").unwrap();

            fs::write(root.join(".svn/wc.db"), &hidden).unwrap();

            prop_assert_eq!(before, hash_dir(&root, ".svn").unwrap());
        }

        /// Property: changing one file's contents changes the hash
        #[test]
        fn content_change_changes_hash(
            tree in tree_strategy().prop_filter("needs a file", |t| !t.is_empty()),
            extra in any::<u8>(),
        ) {
            let temp_dir = TempDir::new().unwrap();
            let root = temp_dir.path().join("t");
            write_tree(&root, &tree);
            let before = hash_dir(&root, ".git").unwrap();

            let (rel, content) = tree.iter().next().unwrap();
            let mut changed = content.clone();
            changed.push(extra);
            fs::write(root.join(rel), changed).unwrap();

            prop_assert_ne!(before, hash_dir(&root, ".git").unwrap());
        }
    }
}
