// SPDX-License-Identifier: MIT OR Apache-2.0

//! Literal scenario tests exercising the solver end to end, as distinct from the unit tests
//! colocated with each module.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use crucible_resolve::{
    constraint_config, forge, partition, Control, Dep, Entry, Error, FlagDecl, FlatFlag, Graph,
    InMemoryRepository, PkgInfo, Version,
};

fn control(name: &str, deps: Vec<Dep>, flags: Vec<FlagDecl>) -> Control {
    Control {
        name: name.into(),
        version: Version::parse("1.0"),
        iteration: 0,
        description: String::new(),
        url: String::new(),
        src: vec![],
        arch: vec![],
        bdeps: vec![],
        deps,
        flags,
    }
}

fn templated(control: Control) -> Entry {
    let mut entry = Entry::new(control);
    entry.template = Some(format!("/templates/{}", entry.control.name).into());
    entry
}

fn tempdir() -> PathBuf {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let mut dir = std::env::temp_dir();
    dir.push(format!("crucible-resolve-scenarios-{}", std::process::id()));
    dir.push(COUNTER.fetch_add(1, Ordering::Relaxed).to_string());
    dir
}

/// S1: A declares `dev` off by default and depends on B only when `+dev`; C depends on
/// `A(+dev)`. Installing C must flip A's flag to on and pull in B transitively.
#[test]
fn s1_conditional_dep_flip() {
    let mut repo = InMemoryRepository::new();
    repo.add_entry(templated(control(
        "a",
        vec!["[+dev]b".parse().unwrap()],
        vec![FlagDecl::new(FlatFlag::new("dev", false))],
    )));
    repo.add_entry(templated(control("b", vec![], vec![])));
    repo.add_entry(templated(control(
        "c",
        vec!["a(+dev)".parse().unwrap()],
        vec![],
    )));

    let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("c"));
    graph.crunch().unwrap();

    let a = graph.node("a").unwrap().pkginfo().unwrap();
    assert!(a.flag_states.is_enabled("dev"));
    assert!(graph.node("b").unwrap().pkginfo().is_some());
    assert!(graph.node("c").unwrap().pkginfo().is_some());
}

/// S2: A (dev off by default) depends on `[-dev]B` and `[+dev]C`; B depends on C; C depends
/// on `A(+dev)`. Installing A must settle on `+dev` via C's parent constraint, leaving B
/// unreached.
#[test]
fn s2_settles_via_dependency_cycle() {
    let mut repo = InMemoryRepository::new();
    repo.add_entry(templated(control(
        "a",
        vec!["[-dev]b".parse().unwrap(), "[+dev]c".parse().unwrap()],
        vec![FlagDecl::new(FlatFlag::new("dev", false))],
    )));
    repo.add_entry(templated(control("b", vec![Dep::named("c")], vec![])));
    repo.add_entry(templated(control(
        "c",
        vec!["a(+dev)".parse().unwrap()],
        vec![],
    )));

    let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("a"));
    graph.crunch().unwrap();

    assert!(graph.node("a").unwrap().pkginfo().is_some());
    assert!(graph.node("c").unwrap().pkginfo().is_some());
    assert!(graph.node("b").unwrap().pkginfo().is_none());
}

/// S3: three prebuilt versions of `libc` exist; a version-bounded request must resolve to the
/// one exact match.
#[test]
fn s3_version_intersection_picks_exact_match() {
    let mut repo = InMemoryRepository::new();
    for version in ["2.31", "2.32", "2.33"] {
        let mut c = control("libc", vec![], vec![]);
        c.version = Version::parse(version);
        let mut entry = Entry::new(c.clone());
        entry.available.push(PkgInfo::from_control(&c));
        repo.add_entry(entry);
    }

    let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
    let dep: Dep = "libc>=2.32 <=2.32".parse().unwrap();
    graph.enable_package(dep);
    graph.crunch().unwrap();

    let bound = graph.node("libc").unwrap().pkginfo().unwrap();
    assert_eq!(bound.version, Version::parse("2.32"));
}

/// S4: two enabled parents request opposite states of the same flag on a shared dependency.
#[test]
fn s4_conflicting_flags_reported_by_name() {
    let mut repo = InMemoryRepository::new();
    repo.add_entry(templated(control(
        "b",
        vec![],
        vec![FlagDecl::new(FlatFlag::new("ssl", false))],
    )));
    repo.add_entry(templated(control("a", vec!["b(+ssl)".parse().unwrap()], vec![])));
    repo.add_entry(templated(control("c", vec!["b(-ssl)".parse().unwrap()], vec![])));

    let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("a"));
    graph.enable_package(Dep::named("c"));
    let err = graph.crunch().unwrap_err();
    assert!(matches!(err, Error::ConflictingFlags { name } if name == "ssl"));
}

/// S5: forging a top-level package whose only build dependency has a prebuilt artifact must
/// yield a sub-graph with nothing left to forge.
#[test]
fn s5_subtree_forge_wields_prebuilt_bdep() {
    let mut repo = InMemoryRepository::new();

    let mut x_control = control("x", vec![], vec![]);
    x_control.bdeps = vec!["y(+dev)".parse().unwrap()];
    repo.add_entry(templated(x_control));

    let y_control = control("y", vec![], vec![FlagDecl::new(FlatFlag::new("dev", false))]);
    let mut y_pkginfo = PkgInfo::from_control(&y_control);
    y_pkginfo.set_flag_state(FlatFlag::new("dev", true)).unwrap();
    let mut y_entry = Entry::new(y_control);
    y_entry.available.push(y_pkginfo);
    repo.add_entry(y_entry);

    let mut graph = Graph::new("/root", Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("x"));
    graph.crunch().unwrap();

    let top = partition(&graph);
    assert_eq!(top.to_forge, vec!["x".to_string()]);

    let plan = forge(&graph, "x", &[]).unwrap();
    assert_eq!(plan.wield, vec!["y".to_string()]);
    assert!(plan.sub_forges.is_empty());
}

/// S6: a root's global constraint config injects a flag request on a package even though no
/// user-supplied constraint ever mentions it.
#[test]
fn s6_global_constraint_injection() {
    constraint_config::clear_cache();
    let root = tempdir();
    fs::create_dir_all(root.join("etc/spack")).unwrap();
    let mut f = fs::File::create(root.join("etc/spack/pkg.conf")).unwrap();
    writeln!(f, "kernel(+lto)").unwrap();
    drop(f);

    let mut repo = InMemoryRepository::new();
    repo.add_entry(templated(control(
        "kernel",
        vec![],
        vec![FlagDecl::new(FlatFlag::new("lto", false))],
    )));

    let mut graph = Graph::new(&root, Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("kernel"));
    graph.crunch().unwrap();

    let kernel = graph.node("kernel").unwrap().pkginfo().unwrap();
    assert!(kernel.flag_states.is_enabled("lto"));

    constraint_config::clear_cache();
    fs::remove_dir_all(root.parent().unwrap()).ok();
}
