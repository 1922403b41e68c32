use waypoint_core::{AdjacentLevel, AreaId, Npc, NpcId, Object, ObjectName, Position, Room};
use waypoint_system_map_data::{encode_row, MapData};

const TOWN: &str = r#"{"type":"map","id":1,"name":"Rogue Encampment","offset":{"x":1000,"y":2000},"size":{"width":4,"height":3},"map":[[1,2],[0,4],[4]],"rooms":[{"x":0,"y":0,"width":2,"height":2}],"objects":[{"type":"npc","id":148,"x":1,"y":2,"name":"Akara"},{"type":"exit","id":2,"x":3,"y":0},{"type":"object","id":119,"x":2,"y":1},{"type":"shrine","id":9,"x":0,"y":0}]}"#;
const MOOR: &str = r#"{"type":"map","id":2,"offset":{"x":1200,"y":2000},"size":{"width":2,"height":2},"map":[[1,1]]}"#;

fn stream(lines: &[&str]) -> String {
    lines.join("\r\n")
}

#[test]
fn keeps_only_level_records_in_order() {
    let output = stream(&[
        "",
        "loading game data",
        TOWN,
        r#"{"type":"","id":5,"map":[[1]]}"#,
        r#"{"type":"map","id":6,"map":[]}"#,
        "{ not json",
        MOOR,
        "",
    ]);

    let map_data = MapData::parse(&output);

    let ids: Vec<u32> = map_data.levels().iter().map(|level| level.id).collect();
    assert_eq!(ids, vec![1, 2], "only valid records survive, in order");
}

#[test]
fn accepts_newline_only_streams() {
    let output = format!("{TOWN}\n\n{MOOR}\n");
    assert_eq!(MapData::parse(&output).len(), 2);
}

#[test]
fn bare_newlines_inside_a_crlf_record_are_kept() {
    let record = "{\"type\":\"map\",\"id\":4,\n\"size\":{\"width\":1,\"height\":1},\"map\":[[0,1]]}";
    let output = stream(&["loading", record, MOOR, ""]);

    let ids: Vec<u32> = MapData::parse(&output)
        .levels()
        .iter()
        .map(|level| level.id)
        .collect();
    assert_eq!(ids, vec![4, 2]);
}

#[test]
fn null_optional_fields_keep_the_level() {
    let with_null_name = r#"{"type":"map","id":1,"size":{"width":2,"height":1},"map":[[1,1]],"objects":[{"type":"exit","id":2,"x":0,"y":0,"name":null}]}"#;
    let with_null_lists =
        r#"{"type":"map","id":3,"size":{"width":2,"height":1},"map":[[1,1]],"rooms":null,"objects":null}"#;

    let map_data = MapData::parse(&stream(&[with_null_name, with_null_lists, ""]));

    assert_eq!(map_data.len(), 2, "explicit nulls do not drop a level");
    let exits = map_data
        .npcs_exits_objects_rooms(Position::default(), AreaId::new(1))
        .exits;
    assert_eq!(exits.len(), 1);
    assert!(map_data.level(AreaId::new(3)).rooms.is_empty());
}

#[test]
fn seed_scenario_decodes_single_level() {
    let record = r#"{"type":"map","id":1,"offset":{"x":0,"y":0},"size":{"width":2,"height":2},"map":[[1,1],[1,1]]}"#;
    let map_data = MapData::parse(&stream(&[record, ""]));

    assert_eq!(map_data.len(), 1);

    let grid = map_data.collision_grid(AreaId::new(1));
    assert_eq!(grid.dimensions(), (2, 2));
    assert_eq!(grid.row(0), Some(&[false, true][..]));
    assert_eq!(grid.row(1), Some(&[false, true][..]));

    let missing = map_data.level(AreaId::new(2));
    assert_eq!(missing.id, 0);
    assert!(missing.kind.is_empty());
    assert!(missing.grid_rows.is_empty());
}

#[test]
fn absent_areas_yield_zero_values() {
    let map_data = MapData::parse(TOWN);
    let absent = AreaId::new(99);

    assert!(map_data.try_level(absent).is_none());
    assert_eq!(map_data.origin(absent), Position::default());
    assert!(map_data.collision_grid(absent).is_empty());
    assert_eq!(map_data.collision_grid(absent).dimensions(), (0, 0));

    let entities = map_data.npcs_exits_objects_rooms(Position::new(5, 5), absent);
    assert!(entities.npcs.is_empty());
    assert!(entities.exits.is_empty());
    assert!(entities.objects.is_empty());
    assert!(entities.rooms.is_empty());
}

#[test]
fn entities_are_translated_by_area_origin() {
    let map_data = MapData::parse(TOWN);
    let area = AreaId::new(1);
    let origin = map_data.origin(area);
    assert_eq!(origin, Position::new(1000, 2000));

    let entities = map_data.npcs_exits_objects_rooms(origin, area);

    assert_eq!(
        entities.npcs,
        vec![Npc {
            id: NpcId::new(148),
            name: "Akara".to_owned(),
            positions: vec![Position::new(1001, 2002)],
        }]
    );
    assert_eq!(
        entities.exits,
        vec![AdjacentLevel {
            area: AreaId::new(2),
            position: Position::new(1003, 2000),
        }]
    );
    assert_eq!(
        entities.objects,
        vec![Object {
            name: ObjectName::new(119),
            position: Position::new(1002, 2001),
        }],
        "unrecognised entity tags are ignored",
    );
    assert_eq!(
        entities.rooms,
        vec![Room {
            position: Position::new(0, 0),
            width: 2,
            height: 2,
        }],
        "rooms keep level-local coordinates",
    );
}

#[test]
fn collision_grid_is_anchored_at_level_offset() {
    let map_data = MapData::parse(TOWN);
    let grid = map_data.collision_grid(AreaId::new(1));

    assert_eq!(grid.origin(), Position::new(1000, 2000));
    assert_eq!(grid.row(0), Some(&[false, true, true, false][..]));
    assert_eq!(grid.row(1), Some(&[true, true, true, true][..]));
    assert_eq!(grid.row(2), Some(&[false, false, false, false][..]));
    assert!(grid.is_walkable(Position::new(1001, 2000)));
    assert!(!grid.is_walkable(Position::new(1000, 2000)));
}

#[test]
fn encoded_rows_survive_a_generator_line() {
    let rows = [
        vec![false, true, true, false, true, true, true, false],
        vec![true, false, false, true, true, false, false, false],
    ];
    let encoded: Vec<Vec<i32>> = rows.iter().map(|row| encode_row(row)).collect();
    let line = format!(
        r#"{{"type":"map","id":3,"size":{{"width":8,"height":2}},"map":{}}}"#,
        serde_json::to_string(&encoded).expect("rows serialize")
    );

    let grid = MapData::parse(&line).collision_grid(AreaId::new(3));

    let decoded: Vec<Vec<bool>> = grid.rows().map(<[bool]>::to_vec).collect();
    assert_eq!(decoded, rows.to_vec());
}
