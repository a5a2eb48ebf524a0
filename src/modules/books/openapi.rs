use serde_json::{json, Value};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

fn book_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/Book" }
            }
        }
    })
}

fn book_id_param() -> Value {
    json!({
        "name": "book_id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int64" }
    })
}

fn payload_body() -> Value {
    json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookCreate" }
            }
        }
    })
}

fn book_fields() -> Value {
    json!({
        "title": { "type": "string", "description": "Title of the book" },
        "author": { "type": "string", "description": "Author of the book" },
        "price": { "type": "number", "format": "double", "description": "Price of the book" },
        "description": { "type": ["string", "null"], "description": "Optional description" },
        "isbn": { "type": "string", "description": "Unique ISBN number" }
    })
}

/// OpenAPI fragment for the books module
pub fn fragment() -> Value {
    let mut book_properties = book_fields();
    book_properties["id"] = json!({ "type": "integer", "format": "int64" });

    json!({
        "tags": [{ "name": "books", "description": "Operations with books" }],
        "paths": {
            "/books/": {
                "get": {
                    "summary": "Retrieve all books with pagination support",
                    "tags": ["books"],
                    "parameters": [
                        {
                            "name": "skip",
                            "in": "query",
                            "required": false,
                            "description": "Number of records to skip",
                            "schema": { "type": "integer", "minimum": 0, "default": 0 }
                        },
                        {
                            "name": "limit",
                            "in": "query",
                            "required": false,
                            "description": "Maximum number of records to return",
                            "schema": { "type": "integer", "minimum": 0, "default": 100 }
                        }
                    ],
                    "responses": {
                        "200": {
                            "description": "Books ordered by id",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Book" }
                                    }
                                }
                            }
                        },
                        "422": error_response("Validation error")
                    }
                },
                "post": {
                    "summary": "Create a new book",
                    "tags": ["books"],
                    "requestBody": payload_body(),
                    "responses": {
                        "201": book_response("Created book"),
                        "400": error_response("ISBN already registered"),
                        "422": error_response("Validation error")
                    }
                }
            },
            "/books/{book_id}": {
                "get": {
                    "summary": "Get a specific book by its ID",
                    "tags": ["books"],
                    "parameters": [book_id_param()],
                    "responses": {
                        "200": book_response("Book"),
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                },
                "put": {
                    "summary": "Update a book's information",
                    "tags": ["books"],
                    "parameters": [book_id_param()],
                    "requestBody": payload_body(),
                    "responses": {
                        "200": book_response("Updated book"),
                        "400": error_response("ISBN already registered"),
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["books"],
                    "parameters": [book_id_param()],
                    "responses": {
                        "200": {
                            "description": "Book deleted",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/Message" }
                                }
                            }
                        },
                        "404": error_response("Book not found"),
                        "422": error_response("Validation error")
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": book_properties,
                    "required": ["id", "title", "author", "price", "isbn"]
                },
                "BookCreate": {
                    "type": "object",
                    "properties": book_fields(),
                    "required": ["title", "author", "price", "isbn"]
                },
                "Message": {
                    "type": "object",
                    "properties": { "message": { "type": "string" } },
                    "required": ["message"]
                }
            }
        }
    })
}
