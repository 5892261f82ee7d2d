/// SQL schema for the Tether database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT UNIQUE NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    headline TEXT,
    summary TEXT,
    location TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);

-- Connections table: one row per user pair, checked in both orientations
-- before insert. Status only ever moves pending -> accepted/declined.
CREATE TABLE IF NOT EXISTS connections (
    id TEXT PRIMARY KEY,
    requester_id TEXT NOT NULL,
    addressee_id TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending' CHECK(status IN ('pending', 'accepted', 'declined')),
    message TEXT CHECK(message IS NULL OR length(message) <= 500),
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (requester_id, addressee_id),
    FOREIGN KEY (requester_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (addressee_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_connections_requester ON connections(requester_id);
CREATE INDEX IF NOT EXISTS idx_connections_addressee ON connections(addressee_id);
CREATE INDEX IF NOT EXISTS idx_connections_status ON connections(status);

-- Posts table
CREATE TABLE IF NOT EXISTS posts (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL CHECK(length(content) <= 3000),
    created_at TEXT NOT NULL,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_posts_author ON posts(author_id);
CREATE INDEX IF NOT EXISTS idx_posts_created_at ON posts(created_at DESC);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    post_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    content TEXT NOT NULL CHECK(length(content) <= 1000),
    created_at TEXT NOT NULL,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id);

-- Likes table: composite key enforces one like per user per post
CREATE TABLE IF NOT EXISTS likes (
    user_id TEXT NOT NULL,
    post_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, post_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (post_id) REFERENCES posts(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_likes_post ON likes(post_id);

-- Experience entries
CREATE TABLE IF NOT EXISTS experiences (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    company TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    location TEXT,
    start_date TEXT NOT NULL,
    end_date TEXT,
    is_current INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_experiences_user ON experiences(user_id);

-- Education entries
CREATE TABLE IF NOT EXISTS education (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    school TEXT NOT NULL,
    degree TEXT,
    field_of_study TEXT,
    description TEXT,
    start_date TEXT NOT NULL,
    end_date TEXT,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_education_user ON education(user_id);

-- Skills (unique per user by name, case-insensitive)
CREATE TABLE IF NOT EXISTS skills (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    name TEXT NOT NULL,
    endorsements INTEGER NOT NULL DEFAULT 0,
    UNIQUE (user_id, name COLLATE NOCASE),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_skills_user ON skills(user_id);

-- Sessions table for authentication
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
"#;

/// Test data for development and testing
/// Includes:
/// - 5 test users with professional profiles
/// - Connections in every lifecycle state
/// - Posts with likes and comments
/// - Experience, education, and skill entries
pub const TEST_DATA: &str = r#"
-- ============================================================================
-- TEST USERS
-- ============================================================================
INSERT OR IGNORE INTO users (id, email, first_name, last_name, headline, summary, location, is_active, created_at) VALUES
    ('550e8400-e29b-41d4-a716-446655440001', 'alice@example.com', 'Alice', 'Nguyen', 'Senior Systems Engineer', 'Ten years of distributed systems work.', 'Portland, OR', 1, '2024-01-01T00:00:00Z'),
    ('550e8400-e29b-41d4-a716-446655440002', 'bob@example.com', 'Bob', 'Okafor', 'Product Designer', 'Design systems and accessibility.', 'Austin, TX', 1, '2024-01-02T00:00:00Z'),
    ('550e8400-e29b-41d4-a716-446655440003', 'carol@example.com', 'Carol', 'Meyer', 'Database Consultant', 'SQLite and Postgres tuning.', 'Berlin', 1, '2024-01-03T00:00:00Z'),
    ('550e8400-e29b-41d4-a716-446655440004', 'dave@example.com', 'Dave', 'Lindqvist', 'Engineering Manager', NULL, 'Stockholm', 1, '2024-01-04T00:00:00Z'),
    ('550e8400-e29b-41d4-a716-446655440005', 'erin@example.com', 'Erin', 'Castillo', 'Security Researcher', 'Appsec and fuzzing.', NULL, 1, '2024-01-05T00:00:00Z');

-- ============================================================================
-- CONNECTIONS
-- ============================================================================
-- alice <-> bob accepted, alice <-> carol accepted, dave -> alice pending,
-- erin -> bob declined, carol -> dave pending
INSERT OR IGNORE INTO connections (id, requester_id, addressee_id, status, message, created_at, updated_at) VALUES
    ('660e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', 'accepted', 'We met at RustConf!', '2024-01-10T09:00:00Z', '2024-01-10T12:00:00Z'),
    ('660e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440001', 'accepted', NULL, '2024-01-11T09:00:00Z', '2024-01-11T10:30:00Z'),
    ('660e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440001', 'pending', 'Hiring for my platform team.', '2024-01-12T09:00:00Z', '2024-01-12T09:00:00Z'),
    ('660e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440002', 'declined', NULL, '2024-01-13T09:00:00Z', '2024-01-13T11:00:00Z'),
    ('660e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440004', 'pending', NULL, '2024-01-14T09:00:00Z', '2024-01-14T09:00:00Z');

-- ============================================================================
-- POSTS
-- ============================================================================
INSERT OR IGNORE INTO posts (id, author_id, content, created_at) VALUES
    ('770e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Shipped a new release of our ingestion pipeline today. Throughput doubled.', '2024-01-20T10:00:00Z'),
    ('770e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440001', 'Writing up what we learned migrating the metrics store.', '2024-01-19T14:30:00Z'),
    ('770e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440002', 'New article: designing empty states that actually help the user.', '2024-01-20T08:00:00Z'),
    ('770e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440003', 'Hot take: most teams never need more than SQLite.', '2024-01-18T12:00:00Z'),
    ('770e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440004', 'We are hiring platform engineers in Stockholm.', '2024-01-21T09:00:00Z'),
    ('770e8400-e29b-41d4-a716-446655440006', '550e8400-e29b-41d4-a716-446655440005', 'Slides from my fuzzing workshop are up.', '2024-01-17T16:00:00Z');

-- ============================================================================
-- LIKES
-- ============================================================================
INSERT OR IGNORE INTO likes (user_id, post_id, created_at) VALUES
    ('550e8400-e29b-41d4-a716-446655440002', '770e8400-e29b-41d4-a716-446655440001', '2024-01-20T10:05:00Z'),
    ('550e8400-e29b-41d4-a716-446655440003', '770e8400-e29b-41d4-a716-446655440001', '2024-01-20T10:10:00Z'),
    ('550e8400-e29b-41d4-a716-446655440001', '770e8400-e29b-41d4-a716-446655440003', '2024-01-20T08:30:00Z'),
    ('550e8400-e29b-41d4-a716-446655440001', '770e8400-e29b-41d4-a716-446655440004', '2024-01-18T13:00:00Z'),
    ('550e8400-e29b-41d4-a716-446655440002', '770e8400-e29b-41d4-a716-446655440004', '2024-01-18T13:30:00Z');

-- ============================================================================
-- COMMENTS
-- ============================================================================
INSERT OR IGNORE INTO comments (id, post_id, author_id, content, created_at) VALUES
    ('880e8400-e29b-41d4-a716-446655440001', '770e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', 'Congrats! What was the bottleneck?', '2024-01-20T10:15:00Z'),
    ('880e8400-e29b-41d4-a716-446655440002', '770e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440003', 'Would love a writeup on the batching change.', '2024-01-20T10:20:00Z'),
    ('880e8400-e29b-41d4-a716-446655440003', '770e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440001', 'Agreed, we run SQLite in production.', '2024-01-18T14:00:00Z');

-- ============================================================================
-- PROFILE COLLECTIONS
-- ============================================================================
INSERT OR IGNORE INTO experiences (id, user_id, company, title, description, location, start_date, end_date, is_current) VALUES
    ('990e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Meshworks', 'Senior Systems Engineer', 'Own the ingestion pipeline.', 'Portland, OR', '2021-03-01', NULL, 1),
    ('990e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440001', 'Gridbase', 'Backend Engineer', NULL, 'Remote', '2017-06-01', '2021-02-28', 0),
    ('990e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440002', 'Studio North', 'Product Designer', 'Design systems lead.', 'Austin, TX', '2019-01-15', NULL, 1);

INSERT OR IGNORE INTO education (id, user_id, school, degree, field_of_study, description, start_date, end_date) VALUES
    ('aa0e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Oregon State University', 'BSc', 'Computer Science', NULL, '2010-09-01', '2014-06-15'),
    ('aa0e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440003', 'TU Berlin', 'MSc', 'Information Systems', NULL, '2012-10-01', '2015-03-31');

INSERT OR IGNORE INTO skills (id, user_id, name, endorsements) VALUES
    ('bb0e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Rust', 12),
    ('bb0e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440001', 'Distributed Systems', 8),
    ('bb0e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440002', 'Figma', 15),
    ('bb0e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440003', 'SQLite', 21);
"#;
