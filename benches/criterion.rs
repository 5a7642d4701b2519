// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use promise_vm::{
    ecmascript::{
        builtins::promise::Promise,
        execution::{Agent, DefaultHostHooks, Options, Realm, run_microtask_queue},
        types::Value,
    },
    engine::Global,
};

struct Setup {
    agent: Agent,
    host_hooks: &'static DefaultHostHooks,
    realm: Realm,
}

impl Setup {
    fn new() -> Self {
        let host_hooks: &'static DefaultHostHooks = Box::leak(Box::default());
        let mut agent = Agent::new(Options::default(), host_hooks);
        let realm = agent.create_realm();
        Self {
            agent,
            host_hooks,
            realm,
        }
    }
}

macro_rules! bench_harness {
    ($($length:literal,)*) => {
        fn bench_then_chains(c: &mut Criterion) {
            $(
                c.bench_function(concat!("then chain of ", $length), |b| {
                    b.iter_batched(
                        Setup::new,
                        |Setup { mut agent, host_hooks, realm }| {
                            agent.run_in_realm(realm, |agent| {
                                let head = Promise::create(agent, realm);
                                let mut tail = head;
                                for _ in 0..$length {
                                    tail = tail.then(agent, Value::Undefined, Value::Undefined);
                                }
                                head.fulfill(agent, Value::from(1));
                            });
                            run_microtask_queue(&mut agent, host_hooks).unwrap();
                        },
                        BatchSize::PerIteration,
                    )
                });
            )*
        }

        fn bench_gc(c: &mut Criterion) {
            $(
                c.bench_function(concat!("gc with rooted and dead chains of ", $length), |b| {
                    b.iter_batched(
                        || {
                            let mut setup = Setup::new();
                            let realm = setup.realm;
                            let root = setup.agent.run_in_realm(realm, |agent| {
                                for _ in 0..$length {
                                    let dead = Promise::create(agent, realm);
                                    dead.then(agent, Value::Undefined, Value::Undefined);
                                }
                                let head = Promise::create(agent, realm);
                                let mut tail = head;
                                for _ in 0..$length {
                                    tail = tail.then(agent, Value::Undefined, Value::Undefined);
                                }
                                Global::new(agent, head)
                            });
                            (setup, root)
                        },
                        |(mut setup, root)| {
                            setup.agent.gc();
                            root.take(&mut setup.agent);
                        },
                        BatchSize::PerIteration,
                    )
                });
            )*
        }
    };
}

bench_harness!(10, 100, 1000,);

criterion_group!(benches, bench_then_chains, bench_gc);
criterion_main!(benches);
