// Copyright 2026 the Accretion Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Producer/consumer behavior with real threads.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use accretion_core::mounting::{MountingConfig, MountingCoordinator, SurfaceTree};
use accretion_core::registry::TreeRegistry;
use accretion_core::tree::{Node, Props, Revision, SurfaceId};
use accretion_harness::{StubViewTree, TreeBuilder};

const SURFACE: SurfaceId = SurfaceId(3);

fn coordinator() -> Arc<MountingCoordinator> {
    Arc::new(MountingCoordinator::new(
        Arc::new(TreeRegistry::new()),
        MountingConfig::development(),
    ))
}

/// Builds `count` successive trees, each reordering, growing, and re-propping
/// the previous one.
fn tree_sequence(count: usize) -> Vec<Node> {
    let mut b = TreeBuilder::new(SURFACE);
    let mut children: Vec<Node> = Vec::new();
    let mut trees = Vec::with_capacity(count);
    for step in 0..count {
        if step % 3 == 0 && !children.is_empty() {
            children.remove(0);
        }
        let len = children.len();
        children.rotate_left(usize::from(len > 1));
        let leaf = b.view([]);
        children.push(b.view([leaf]));
        let step = i64::try_from(step).unwrap_or(i64::MAX);
        trees.push(
            b.root(children.clone())
                .with_props(Props::new().with("step", step)),
        );
    }
    trees
}

#[test]
fn consumer_sees_strictly_increasing_revisions() {
    const COMMITS: usize = 200;
    let coordinator = coordinator();
    let trees = tree_sequence(COMMITS);
    let last = trees.last().cloned().unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let producer = {
        let coordinator = coordinator.clone();
        let done = done.clone();
        thread::spawn(move || {
            for tree in trees {
                coordinator.commit(SURFACE, tree).unwrap();
            }
            done.store(true, Ordering::Release);
        })
    };

    let mut stub = StubViewTree::new();
    let mut pulled = Revision::INITIAL;
    let mut pulls = 0;
    loop {
        let finished = done.load(Ordering::Acquire);
        if let Some(transaction) = coordinator.pull_transaction(SURFACE) {
            assert!(transaction.revision() > pulled);
            assert_eq!(transaction.base_revision(), pulled);
            stub.apply_all(transaction.mutations()).unwrap();
            pulled = transaction.revision();
            pulls += 1;
        } else if finished {
            break;
        } else {
            thread::yield_now();
        }
    }
    producer.join().unwrap();

    assert_eq!(pulled, Revision(COMMITS as u64));
    assert!(pulls >= 1);
    assert_eq!(stub, StubViewTree::from_root(&last));
    coordinator.registry().drain();
}

#[test]
fn wait_for_transaction_blocks_until_commit() {
    let registry = Arc::new(TreeRegistry::new());
    let coordinator = Arc::new(MountingCoordinator::new(
        registry.clone(),
        MountingConfig::development(),
    ));
    let b = TreeBuilder::new(SURFACE);
    coordinator.commit(SURFACE, b.root([])).unwrap();
    coordinator.pull_transaction(SURFACE).unwrap();

    let surface = registry.get(SURFACE).unwrap();
    let consumer = thread::spawn(move || surface.wait_for_transaction(Duration::from_secs(10)));
    thread::sleep(Duration::from_millis(20));
    coordinator.commit(SURFACE, b.root([])).unwrap();

    let transaction = consumer.join().unwrap().unwrap();
    assert_eq!(transaction.revision(), Revision(2));
    registry.drain();
}

#[test]
fn revision_lock_blocks_commits_until_released() {
    let coordinator = coordinator();
    let b = TreeBuilder::new(SURFACE);
    coordinator.commit(SURFACE, b.root([])).unwrap();
    coordinator.pull_transaction(SURFACE).unwrap();

    let surface = coordinator.registry().get(SURFACE).unwrap();
    let committed = Arc::new(AtomicBool::new(false));
    let lock = surface.revision_lock();
    assert_eq!(lock.revision(), Revision(1));

    let producer = {
        let coordinator = coordinator.clone();
        let committed = committed.clone();
        let root = b.root([]);
        thread::spawn(move || {
            let revision = coordinator.commit(SURFACE, root).unwrap();
            committed.store(true, Ordering::Release);
            revision
        })
    };

    thread::sleep(Duration::from_millis(50));
    assert!(!committed.load(Ordering::Acquire));
    assert!(!surface.has_pending_transaction());
    // Reads stay available while a commit waits on the lock.
    assert_eq!(surface.revision(), Revision(1));
    assert_eq!(lock.revision(), Revision(1));

    drop(lock);
    assert_eq!(producer.join().unwrap(), Revision(2));
    assert!(committed.load(Ordering::Acquire));
    assert_eq!(surface.revision(), Revision(2));
    coordinator.registry().drain();
}

#[test]
fn commit_empty_waits_for_an_in_flight_commit() {
    let coordinator = coordinator();
    let mut b = TreeBuilder::new(SURFACE);
    coordinator.commit(SURFACE, b.root([])).unwrap();
    coordinator.pull_transaction(SURFACE).unwrap();

    let surface = coordinator.registry().get(SURFACE).unwrap();
    let lock = surface.revision_lock();

    let producer = {
        let coordinator = coordinator.clone();
        let child = b.view([]);
        let root = b.root([child]).with_props(Props::new().with("step", 1_i64));
        thread::spawn(move || coordinator.commit(SURFACE, root).unwrap())
    };
    thread::sleep(Duration::from_millis(50));
    let clearer = {
        let coordinator = coordinator.clone();
        thread::spawn(move || coordinator.commit_empty(SURFACE).unwrap())
    };
    thread::sleep(Duration::from_millis(50));
    assert_eq!(surface.revision(), Revision(1));

    drop(lock);
    assert_eq!(producer.join().unwrap(), Revision(2));
    assert_eq!(clearer.join().unwrap(), Some(Revision(3)));

    // The empty tree is built from the producer's root, not a stale one.
    let snapshot = surface.current_snapshot().unwrap();
    assert_eq!(snapshot.revision(), Revision(3));
    assert!(snapshot.root().children().is_empty());
    assert!(snapshot.root().props().get("step").is_some());
    coordinator.registry().drain();
}

#[test]
fn with_revision_lock_sees_a_stable_tree() {
    let coordinator = coordinator();
    let b = TreeBuilder::new(SURFACE);
    assert!(
        coordinator
            .with_revision_lock(SURFACE, |_| ())
            .is_none()
    );
    coordinator.commit(SURFACE, b.root([])).unwrap();

    let seen = coordinator
        .with_revision_lock(SURFACE, |lock| {
            let first = lock.snapshot().cloned();
            let second = coordinator.registry().get(SURFACE).unwrap().current_snapshot();
            (lock.revision(), first.zip(second).is_some_and(|(a, b)| Arc::ptr_eq(&a, &b)))
        })
        .unwrap();
    assert_eq!(seen, (Revision(1), true));
    coordinator.registry().drain();
}

#[test]
fn registry_keeps_one_entry_per_surface_under_contention() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 500;
    let registry = Arc::new(TreeRegistry::new());
    let balance = Arc::new(AtomicI64::new(0));
    let barrier = Arc::new(Barrier::new(THREADS));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = registry.clone();
            let balance = balance.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for round in 0..ROUNDS {
                    let tree = Arc::new(SurfaceTree::new(SURFACE, MountingConfig::development()));
                    if registry.add(tree) {
                        balance.fetch_add(1, Ordering::AcqRel);
                    }
                    registry.visit(SURFACE, |tree| assert_eq!(tree.surface_id(), SURFACE));
                    if round % 2 == 0 && registry.remove(SURFACE).is_some() {
                        balance.fetch_sub(1, Ordering::AcqRel);
                    }
                    assert!(registry.len() <= 1);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let live = registry.len();
    assert!(live <= 1);
    assert_eq!(balance.load(Ordering::Acquire), live as i64);
    assert_eq!(registry.get(SURFACE).is_some(), live == 1);
    registry.drain();
}

#[test]
fn independent_surfaces_commit_concurrently() {
    let coordinator = coordinator();
    let producers: Vec<_> = (1..=4_u32)
        .map(|id| {
            let coordinator = coordinator.clone();
            thread::spawn(move || {
                let mut b = TreeBuilder::new(SurfaceId(id));
                let mut tree = b.root([]);
                for _ in 0..20 {
                    let child = b.view([]);
                    let mut children = tree.children().to_vec();
                    children.push(child);
                    tree = tree.with_children(children);
                    coordinator.commit(SurfaceId(id), tree.clone()).unwrap();
                }
                tree
            })
        })
        .collect();

    for (id, producer) in (1..=4_u32).zip(producers) {
        let tree = producer.join().unwrap();
        let transaction = coordinator.pull_transaction(SurfaceId(id)).unwrap();
        assert_eq!(transaction.revision(), Revision(20));
        let mut stub = StubViewTree::new();
        stub.apply_all(transaction.mutations()).unwrap();
        assert_eq!(stub, StubViewTree::from_root(&tree));
    }
    assert_eq!(coordinator.registry().len(), 4);
    coordinator.registry().drain();
}
