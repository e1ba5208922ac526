// SPDX-License-Identifier: MIT OR Apache-2.0

//! Solves a small graph where one package has no prebuilt artifact, then prints the forge/wield
//! partition and the resulting build plan.

use std::sync::Arc;

use crucible_resolve::{forge, partition, Control, Dep, Entry, Graph, InMemoryRepository, PkgInfo, Version};

fn control(name: &str, bdeps: Vec<Dep>) -> Control {
    Control {
        name: name.into(),
        version: Version::parse("1.0"),
        iteration: 0,
        description: String::new(),
        url: String::new(),
        src: vec![],
        arch: vec![],
        bdeps,
        deps: vec![],
        flags: vec![],
    }
}

fn main() {
    let mut repo = InMemoryRepository::new();

    // "app" has only a source template: it must be forged.
    let mut app = Entry::new(control("app", vec![Dep::named("libfoo")]));
    app.template = Some("/templates/app".into());
    repo.add_entry(app);

    // "libfoo" has a prebuilt artifact available: it can be wielded directly.
    let foo_control = control("libfoo", vec![]);
    let foo_pkginfo = PkgInfo::from_control(&foo_control);
    let mut libfoo = Entry::new(foo_control);
    libfoo.available.push(foo_pkginfo);
    repo.add_entry(libfoo);

    let mut graph = Graph::new("/", Arc::new(repo)).unwrap();
    graph.enable_package(Dep::named("app"));
    graph.crunch().unwrap();

    let top = partition(&graph);
    println!("top-level forge: {:?}", top.to_forge);
    println!("top-level wield: {:?}", top.to_wield);

    for name in &top.to_forge {
        let plan = forge(&graph, name, &[]).unwrap();
        println!("forge plan for {}: wields {:?}", plan.name, plan.wield);
    }
}
