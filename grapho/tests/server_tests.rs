// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! End-to-end server tests over a real TCP connection

#[path = "testutils/mod.rs"]
mod testutils;

use grapho::server::LogFormat;
use testutils::server_fixture::{assert_response_contains, ServerFixture};

#[test]
fn create_and_insert_over_tcp() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Binary).unwrap();
    let mut client = fixture.client();

    let response = client.send(
        "CREATE NODE Person(name: STRING, age: INT); INSERT NODE Person (name: 'Alice', age: 30);",
    );
    assert_response_contains(&response, "Node inserted with ID: 1");
    assert_response_contains(&response, "OK - 2 statement(s) executed successfully");

    let response = client.send("MATCH Person;");
    assert_response_contains(&response, "MATCH Results:");
    assert_response_contains(&response, "Nodes of type 'Person':");
    assert_response_contains(&response, "name: Alice");
    assert_response_contains(&response, "_id: 1");

    client.quit();
    fixture.stop();
}

#[test]
fn parse_errors_are_reported_without_state_change() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Text).unwrap();
    let mut client = fixture.client();

    let response = client.send("CREATE NODE (id: int);");
    assert_response_contains(&response, "Parse errors:");

    // recovery keeps later statements in one command
    let response = client.send("FOO BAR; CREATE NODE A(id: int);");
    assert_response_contains(&response, "Parse errors:");

    // the catalog was not touched by either command
    let response = client.send("INSERT NODE A (id: 1);");
    assert_response_contains(&response, "Error executing statement 1");
    assert_response_contains(&response, "node type 'A' does not exist");

    client.quit();
    fixture.stop();
}

#[test]
fn execution_errors_abort_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Binary).unwrap();
    let mut client = fixture.client();

    client.send("CREATE NODE A(x: INT); CREATE NODE B(x: INT); CREATE EDGE R(FROM A ONE, TO B ONE);");
    client.send("INSERT NODE A(x: 1); INSERT NODE B(x: 2);");

    let response = client.send("INSERT EDGE R FROM B(x: 2) TO A(x: 1);");
    assert_response_contains(
        &response,
        "FROM node type 'B' does not match edge FROM type 'A'",
    );

    client.quit();
    fixture.stop();
}

#[test]
fn multiple_clients_share_state() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Binary).unwrap();

    let mut first = fixture.client();
    first.send("CREATE NODE Person(name: STRING);");
    first.send("INSERT NODE Person (name: 'Alice');");

    let mut second = fixture.client();
    let response = second.send("MATCH Person;");
    assert_response_contains(&response, "name: Alice");

    first.quit();
    second.quit();
    fixture.stop();
}

#[test]
fn multiline_commands_are_buffered_until_semicolon() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Binary).unwrap();
    let mut client = fixture.client();

    // the command spans three protocol lines
    let response = client.send("CREATE NODE Person(\n  name: STRING,\n  age: INT\n);");
    assert_response_contains(&response, "OK - 1 statement(s) executed successfully");

    client.quit();
    fixture.stop();
}

#[test]
fn ddl_validation_errors_reach_the_client() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = ServerFixture::start(dir.path(), LogFormat::Binary).unwrap();
    let mut client = fixture.client();

    let response = client.send("CREATE NODE P(id1: UUID PRIMARY KEY, id2: UUID PRIMARY KEY);");
    assert_response_contains(&response, "multiple PRIMARY KEY");

    client.send("CREATE NODE Person(name: STRING);");
    client.send("CREATE EDGE KNOWS(FROM Person MANY, TO Person MANY);");
    let response = client.send("DROP NODE Person;");
    assert_response_contains(&response, "referenced by edge");

    client.quit();
    fixture.stop();
}
