// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds a tiny in-memory repository, enables a top-level package, and prints what `crunch`
//! decided to bind every reachable node to.

use std::sync::Arc;

use crucible_resolve::{Control, Dep, Entry, Graph, InMemoryRepository, Version};

fn control(name: &str, deps: Vec<Dep>) -> Control {
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
        flags: vec![],
    }
}

fn templated(name: &str, deps: Vec<Dep>) -> Entry {
    let mut entry = Entry::new(control(name, deps));
    entry.template = Some(format!("/templates/{}", name).into());
    entry
}

fn main() {
    let mut repo = InMemoryRepository::new();
    repo.add_entry(templated("app", vec![Dep::named("libfoo")]));
    repo.add_entry(templated("libfoo", vec![Dep::named("libbar")]));
    repo.add_entry(templated("libbar", vec![]));

    let mut graph = Graph::new("/", Arc::new(repo)).expect("repository has no duplicate names");
    graph.enable_package(Dep::named("app"));
    graph.crunch().expect("solve should converge");

    for node in graph.nodes() {
        match node.pkginfo() {
            Some(pkginfo) => println!("{:<10} -> {} ({:?})", node.name(), pkginfo.id(), node.install_type()),
            None => println!("{:<10} -> (not enabled)", node.name()),
        }
    }
}
