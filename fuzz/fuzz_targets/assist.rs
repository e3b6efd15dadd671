#![no_main]

use libfuzzer_sys::fuzz_target;
use sqlsense_core::{
    AssistConfig, BufferSnapshot, Catalog, Column, Database, Position, SqlAssistant, Table,
    TextBuffer,
};

fn catalog() -> Catalog {
    Catalog {
        databases: vec![Database {
            schema: Some("public".to_string()),
            tables: vec![Table {
                name: "users".to_string(),
                columns: vec![Column::new("id", 1), Column::new("name", 2)],
                ..Default::default()
            }],
            ..Default::default()
        }],
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&seed, rest)) = data.split_first() else {
        return;
    };
    let Ok(sql) = std::str::from_utf8(rest) else {
        return;
    };

    let buffer = BufferSnapshot::new(sql);
    let assistant = SqlAssistant::new(&catalog(), AssistConfig::default());

    let line = usize::from(seed % 8) + 1;
    let column = usize::from(seed / 8) + 1;
    let position = Position::new(line.min(buffer.line_count()), column);

    let items = assistant.get_completions(&buffer, position);
    for (rank, item) in items.iter().enumerate() {
        assert_eq!(item.sort_rank as usize, rank);
    }

    let _ = assistant.get_hover(&buffer, position);

    let span = assistant.get_statement_span(&buffer, position.line);
    assert!(span.start_line <= span.end_line);
    assert!(span.end_line <= buffer.line_count());
});
