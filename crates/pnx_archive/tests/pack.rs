use miette::{IntoDiagnostic, Result};
use pnx_archive::{
    aggregate::FailurePolicy,
    error::Error,
    pack,
    write::{ArchiveWriterOptions, DEFAULT_ARCHIVE_NAME},
    ArchiveNode, ArchiveReader, BlockStateRegistry, PackOptions, VerifyOutcome,
};
use pretty_assertions::assert_eq;
use quartz_nbt::{io::Flavor, NbtCompound, NbtList};
use std::{fs, path::Path};
use tracing_test::traced_test;

/// Save a structure with one block per palette entry, placed along x
fn write_structure(path: &Path, size: [i32; 3], names: &[&str]) -> Result<()> {
    let mut size_list = NbtList::new();
    size.iter().for_each(|v| size_list.push(*v));

    let mut palette = NbtList::new();
    let mut blocks = NbtList::new();
    for (i, name) in names.iter().enumerate() {
        let mut entry = NbtCompound::new();
        entry.insert("Name", *name);
        palette.push(entry);

        let mut pos = NbtList::new();
        [i as i32, 0, 0].iter().for_each(|v| pos.push(*v));
        let mut block = NbtCompound::new();
        block.insert("pos", pos);
        block.insert("state", i as i32);
        blocks.push(block);
    }

    let mut root = NbtCompound::new();
    root.insert("DataVersion", 3465);
    root.insert("size", size_list);
    root.insert("palette", palette);
    root.insert("blocks", blocks);

    let mut file = fs::File::create(path).into_diagnostic()?;
    quartz_nbt::io::write_nbt(&mut file, None, &root, Flavor::GzCompressed).into_diagnostic()?;
    Ok(())
}

#[traced_test]
#[test]
fn pack_directory_round_trip() -> Result<()> {
    let input = tempfile::tempdir().into_diagnostic()?;
    let output = tempfile::tempdir().into_diagnostic()?;
    let archive = output.path().join(DEFAULT_ARCHIVE_NAME);

    write_structure(
        &input.path().join("hut.nbt"),
        [2, 2, 2],
        &["minecraft:stone", "minecraft:oak_planks"],
    )?;
    fs::create_dir_all(input.path().join("village/empty")).into_diagnostic()?;
    write_structure(
        &input.path().join("village/tower.nbt"),
        [3, 5, 1],
        &["minecraft:cobblestone", "minecraft:torch", "minecraft:ladder"],
    )?;
    fs::write(input.path().join("village/README.md"), "notes").into_diagnostic()?;

    let registry = BlockStateRegistry::default();
    let report = pack(
        input.path(),
        &archive,
        &registry,
        &PackOptions::default(),
        ArchiveWriterOptions::default(),
    )?;

    assert_eq!(report.stats.structures, 2);
    assert_eq!(report.stats.skipped, 1);
    assert_eq!(
        report.verification,
        VerifyOutcome::Verified {
            bytes: report.bytes,
            top_level: 2,
            structures: 2
        }
    );

    let root = ArchiveReader::open(&archive)?;
    let hut = root
        .get("hut")
        .and_then(ArchiveNode::as_structure)
        .ok_or_else(|| miette::miette!("hut missing"))?;
    assert_eq!(hut.size, [2, 2, 2]);
    assert_eq!(hut.palette.len(), 2);
    assert_eq!(hut.blocks.len(), 8);

    let tower = root
        .get("village/tower")
        .and_then(ArchiveNode::as_structure)
        .ok_or_else(|| miette::miette!("tower missing"))?;
    assert_eq!(tower.size, [3, 5, 1]);
    assert_eq!(tower.blocks.len(), 15);
    assert_eq!(&tower.blocks[..3], &[1, 2, 3]);

    assert_eq!(root.get("village/empty"), Some(&ArchiveNode::directory()));
    assert!(logs_contain("is not a structure file"));

    Ok(())
}

#[traced_test]
#[test]
fn abort_without_structures() -> Result<()> {
    let input = tempfile::tempdir().into_diagnostic()?;
    let output = tempfile::tempdir().into_diagnostic()?;
    let archive = output.path().join(DEFAULT_ARCHIVE_NAME);
    fs::write(input.path().join("notes.txt"), "nothing here").into_diagnostic()?;

    let result = pack(
        input.path(),
        &archive,
        &BlockStateRegistry::default(),
        &PackOptions::default(),
        ArchiveWriterOptions::default(),
    );

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!archive.exists());

    Ok(())
}

#[traced_test]
#[test]
fn abort_on_missing_directory() -> Result<()> {
    let output = tempfile::tempdir().into_diagnostic()?;
    let archive = output.path().join(DEFAULT_ARCHIVE_NAME);

    let result = pack(
        &output.path().join("missing"),
        &archive,
        &BlockStateRegistry::default(),
        &PackOptions::default(),
        ArchiveWriterOptions::default(),
    );

    assert!(matches!(result, Err(Error::InvalidInput(_))));
    assert!(!archive.exists());

    Ok(())
}

#[traced_test]
#[test]
fn strict_run_stops_on_broken_file() -> Result<()> {
    let input = tempfile::tempdir().into_diagnostic()?;
    let output = tempfile::tempdir().into_diagnostic()?;
    let archive = output.path().join(DEFAULT_ARCHIVE_NAME);

    write_structure(&input.path().join("good.nbt"), [1, 1, 1], &["minecraft:stone"])?;
    fs::write(input.path().join("broken.nbt"), b"definitely not nbt").into_diagnostic()?;

    let registry = BlockStateRegistry::default();
    let lenient = pack(
        input.path(),
        &archive,
        &registry,
        &PackOptions::default(),
        ArchiveWriterOptions::default(),
    )?;
    assert_eq!(lenient.stats.structures, 1);
    assert_eq!(lenient.stats.failed, 1);

    fs::remove_file(&archive).into_diagnostic()?;
    let strict = pack(
        input.path(),
        &archive,
        &registry,
        &PackOptions::builder().failure(FailurePolicy::Abort).build(),
        ArchiveWriterOptions::default(),
    );
    assert!(strict.is_err());
    assert!(!archive.exists());

    Ok(())
}

#[traced_test]
#[test]
fn existing_archive_is_kept() -> Result<()> {
    let input = tempfile::tempdir().into_diagnostic()?;
    let output = tempfile::tempdir().into_diagnostic()?;
    let archive = output.path().join(DEFAULT_ARCHIVE_NAME);

    write_structure(&input.path().join("hut.nbt"), [1, 1, 1], &["minecraft:stone"])?;
    fs::write(&archive, b"keep me").into_diagnostic()?;

    let registry = BlockStateRegistry::default();
    let result = pack(
        input.path(),
        &archive,
        &registry,
        &PackOptions::default(),
        ArchiveWriterOptions::default(),
    );
    assert!(matches!(result, Err(Error::WriteFailure { .. })));
    assert_eq!(fs::read(&archive).into_diagnostic()?, b"keep me");

    let report = pack(
        input.path(),
        &archive,
        &registry,
        &PackOptions::default(),
        ArchiveWriterOptions::builder().overwrite(true).build(),
    )?;
    assert!(report.verification.is_success());

    Ok(())
}
