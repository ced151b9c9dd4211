use anyhow::Result;
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::Path;
use tempfile::tempdir;
use threadgrep::search::{collect_files, dispatch};
use threadgrep::{build_reports, search, ScanConfig, SkipStage, WorkerOutcome};

fn create_test_files(dir: &Path, files: &[(&str, &str)]) -> Result<()> {
    for (name, content) in files {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
    }
    Ok(())
}

fn config(root: &Path, pattern: &str, threads: usize) -> ScanConfig {
    ScanConfig::new(pattern, root, "threadgrep")
        .with_thread_count(NonZeroUsize::new(threads).unwrap())
}

/// Makes `path` unreadable; returns false when the current user can read it anyway
#[cfg(unix)]
fn make_unreadable(path: &Path) -> Result<bool> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o000))?;
    Ok(File::open(path).is_err())
}

#[test]
fn test_end_to_end_example() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[("a.txt", "foo\nbar foo\nbaz\n"), ("b.txt", "foo\n")],
    )?;

    let output = search(&config(dir.path(), "foo", 2))?;
    let (results, workers) = build_reports(&output);

    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    assert_eq!(
        results.render(),
        format!(
            "{a}:1: foo\n{a}:2: bar foo\n{b}:1: foo\n",
            a = a.display(),
            b = b.display()
        )
    );
    assert_eq!(results.files_with_matches(), 2);
    assert_eq!(results.total_matches(), 3);
    assert_eq!(output.files_searched, 2);

    // One file per worker, equal counts keep worker order
    assert_eq!(
        workers.render(),
        format!("0:{}\n1:{}\n", a.display(), b.display())
    );
    Ok(())
}

#[test]
fn test_many_files_many_threads() -> Result<()> {
    let dir = tempdir()?;
    for i in 0..25 {
        let mut file = File::create(dir.path().join(format!("test_{:02}.txt", i)))?;
        for j in 0..=i {
            writeln!(file, "Line {} TODO implement this", j)?;
            writeln!(file, "Line {} nothing special", j)?;
        }
    }

    let output = search(&config(dir.path(), "TODO", 4))?;
    let (results, workers) = build_reports(&output);

    assert_eq!(output.files_searched, 25);
    assert_eq!(results.files_with_matches(), 25);
    assert_eq!(results.total_matches(), (1..=25).sum::<usize>());

    let counts: Vec<_> = results.files.iter().map(|f| f.matches.len()).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
    for file in &results.files {
        assert!(file
            .matches
            .windows(2)
            .all(|w| w[0].line_number < w[1].line_number));
        assert!(file.matches.iter().all(|m| m.line.contains("TODO")));
    }

    // 25 / 4 = 6 each, the last worker takes 7
    let sizes: Vec<_> = workers.workers.iter().map(|w| w.files.len()).collect();
    assert_eq!(sizes, vec![7, 6, 6, 6]);
    assert_eq!(workers.workers[0].worker.0, 3);
    Ok(())
}

#[test]
fn test_workers_without_matches_listed_last() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("1.txt", "nothing\n"),
            ("2.txt", "nothing\n"),
            ("3.txt", "needle\n"),
        ],
    )?;

    let output = search(&config(dir.path(), "needle", 3))?;
    assert_eq!(output.workers[0].outcome, WorkerOutcome::NoMatches);
    assert_eq!(output.workers[1].outcome, WorkerOutcome::NoMatches);

    let (results, workers) = build_reports(&output);
    assert_eq!(results.total_matches(), 1);
    assert_eq!(
        workers.render(),
        format!("2:{}\n0:\n1:\n", dir.path().join("3.txt").display())
    );
    Ok(())
}

#[test]
fn test_more_threads_than_files() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(dir.path(), &[("only.txt", "x foo\n")])?;

    let output = search(&config(dir.path(), "foo", 8))?;
    let (results, workers) = build_reports(&output);

    assert_eq!(output.workers.len(), 8);
    assert_eq!(results.total_matches(), 1);
    assert_eq!(workers.workers.len(), 8);
    assert_eq!(workers.workers[0].worker.0, 7);
    Ok(())
}

#[test]
fn test_nested_directories() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("top.txt", "foo\n"),
            ("src/mod.rs", "// foo\nfn main() {}\n// foo again\n"),
            ("src/deep/er/leaf.md", "# foo\n"),
        ],
    )?;

    let output = search(&config(dir.path(), "foo", 2))?;
    let (results, _) = build_reports(&output);

    assert_eq!(output.files_searched, 3);
    assert_eq!(results.files_with_matches(), 3);
    assert_eq!(results.files[0].path, dir.path().join("src/mod.rs"));
    Ok(())
}

#[test]
fn test_repeated_scans_are_identical() -> Result<()> {
    let dir = tempdir()?;
    for i in 0..12 {
        create_test_files(
            dir.path(),
            &[(
                format!("f{}.txt", i).as_str(),
                "foo\nbar\nfoo bar\n".repeat(i % 3 + 1).as_str(),
            )],
        )?;
    }

    let first = build_reports(&search(&config(dir.path(), "foo", 5))?);
    let second = build_reports(&search(&config(dir.path(), "foo", 5))?);

    assert_eq!(first.0.render(), second.0.render());
    assert_eq!(first.1.render(), second.1.render());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[("locked.txt", "foo\n"), ("open.txt", "foo\nfoo\n")],
    )?;
    let locked = dir.path().join("locked.txt");
    if !make_unreadable(&locked)? {
        // Running with privileges that bypass file permissions
        return Ok(());
    }

    let output = search(&config(dir.path(), "foo", 1))?;
    let (results, _) = build_reports(&output);

    assert_eq!(output.files_searched, 2);
    assert_eq!(results.files_with_matches(), 1);
    assert_eq!(results.total_matches(), 2);

    let skipped: Vec<_> = output.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].path, locked);
    Ok(())
}

#[test]
fn test_file_removed_after_enumeration_is_skipped() -> Result<()> {
    let dir = tempdir()?;
    create_test_files(
        dir.path(),
        &[
            ("a.txt", "foo\nbar foo\n"),
            ("b.txt", "foo\n"),
            ("c.txt", "no match\n"),
            ("d.txt", "foo\n"),
        ],
    )?;

    let files = collect_files(dir.path())?;
    let removed = dir.path().join("b.txt");
    fs::remove_file(&removed)?;

    let output = dispatch(files, 2, "foo")?;
    let (results, workers) = build_reports(&output);

    // The vanished file still counts as searched
    assert_eq!(output.files_searched, 4);
    assert_eq!(results.files_with_matches(), 2);
    assert_eq!(results.total_matches(), 3);
    assert!(results.files.iter().all(|f| f.path != removed));

    let skipped: Vec<_> = output.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].path, removed);
    assert_eq!(skipped[0].stage, SkipStage::Open);

    assert_eq!(
        workers.render(),
        format!(
            "0:{}\n1:{}\n",
            dir.path().join("a.txt").display(),
            dir.path().join("d.txt").display()
        )
    );
    Ok(())
}

#[test]
fn test_missing_root_directory() {
    let dir = tempdir().unwrap();
    let result = search(&config(&dir.path().join("missing"), "foo", 2));
    assert!(matches!(
        result,
        Err(threadgrep::ScanError::DirectoryNotFound(_))
    ));
}
