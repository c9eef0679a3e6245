use border_memory::{
    Column, DType, FieldSpec, Memory, MemoryConfig, RecordBatch, RetrievalMode, Schema,
    SharedMemory,
};
use log::info;
use std::thread;
use test_log::test;

const CAPACITY: usize = 64;
const N_BATCHES: i64 = 200;
const BATCH_SIZE: i64 = 13;

fn schema() -> Schema {
    Schema::new(vec![
        FieldSpec::new("states", &[3], DType::F32),
        FieldSpec::scalar("actions", DType::I64),
        FieldSpec::scalar("reward", DType::F32),
        FieldSpec::scalar("terminals", DType::Bool),
    ])
    .unwrap()
}

/// Records whose fields all hold their insertion number.
fn records(start: i64, n: i64) -> RecordBatch {
    let ids = (start..start + n).collect::<Vec<_>>();
    RecordBatch::new()
        .with(
            "states",
            Column::from_f32(&[3], ids.iter().flat_map(|&i| vec![i as f32; 3]).collect()).unwrap(),
        )
        .with("actions", Column::from_i64(&[], ids.clone()).unwrap())
        .with(
            "reward",
            Column::from_f32(&[], ids.iter().map(|&i| i as f32).collect()).unwrap(),
        )
        .with(
            "terminals",
            Column::from_bool(&[], ids.iter().map(|&i| i % 7 == 6).collect()).unwrap(),
        )
}

fn shared_memory(mode: RetrievalMode) -> SharedMemory<Memory> {
    let config = MemoryConfig::default()
        .capacity(CAPACITY)
        .schema(schema())
        .mode(mode)
        .sample_episodes(false);
    SharedMemory::build(&config).unwrap()
}

fn spawn_writer(memory: SharedMemory<Memory>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        for b in 0..N_BATCHES {
            memory.insert(&records(b * BATCH_SIZE, BATCH_SIZE)).unwrap();
        }
    })
}

/// Checks that every record of the batch comes from a single insertion.
fn check_records(batch: &RecordBatch) -> Vec<i64> {
    let actions = batch.get("actions").unwrap().as_i64().unwrap();
    let states = batch.get("states").unwrap().as_f32().unwrap();
    let reward = batch.get("reward").unwrap().as_f32().unwrap();
    let terminals = batch.get("terminals").unwrap().as_bool().unwrap();

    let ids = actions.iter().copied().collect::<Vec<_>>();
    for (i, id) in ids.iter().enumerate() {
        assert_eq!(reward[[i]], *id as f32);
        assert_eq!(terminals[[i]], id % 7 == 6);
        for j in 0..3 {
            assert_eq!(states[[i, j]], *id as f32);
        }
    }
    ids
}

#[test]
fn test_uniform_readers() {
    let memory = shared_memory(RetrievalMode::Uniform);
    let writer = spawn_writer(memory.clone());

    let readers = (0..3)
        .map(|_| {
            let memory = memory.clone();
            thread::spawn(move || {
                let mut n_sampled = 0;
                for _ in 0..300 {
                    let batch = memory.batch(16).unwrap();
                    let ids = check_records(&batch);
                    assert!(ids.iter().all(|id| id % 7 != 6));

                    let next_states = batch.get("next_states").unwrap().as_f32().unwrap();
                    for (i, id) in ids.iter().enumerate() {
                        let next = next_states[[i, 0]];
                        assert!(next == (id + 1) as f32 || next == *id as f32);
                    }
                    n_sampled += ids.len();
                }
                n_sampled
            })
        })
        .collect::<Vec<_>>();

    writer.join().unwrap();
    for r in readers {
        info!("Sampled {} records", r.join().unwrap());
    }
    assert_eq!(memory.len().unwrap(), CAPACITY);
}

#[test]
fn test_episodic_readers() {
    let memory = shared_memory(RetrievalMode::Episodic);
    let writer = spawn_writer(memory.clone());

    let reader = {
        let memory = memory.clone();
        thread::spawn(move || {
            for _ in 0..300 {
                let batch = memory.batch(CAPACITY).unwrap();
                let ids = check_records(&batch);
                // Recent records are consecutive and end at the newest record.
                assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
            }
        })
    };

    writer.join().unwrap();
    reader.join().unwrap();

    let total = N_BATCHES * BATCH_SIZE;
    let batch = memory.batch(CAPACITY).unwrap();
    assert_eq!(check_records(&batch), (total - CAPACITY as i64..total).collect::<Vec<_>>());
}
