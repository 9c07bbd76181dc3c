/// A TypeScript expression lowered into the shapes the extractors recognize.
///
/// The variant set is closed on purpose: anything the schema DSL does not
/// use collapses into [`Expr::Other`] carrying the syntax kind, so extractors
/// can match exhaustively without depending on the parsing library.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// String literal with escapes resolved.
    Str(String),
    /// Numeric literal; a leading unary minus is folded in.
    Number(f64),
    /// `true` / `false`.
    Bool(bool),
    /// `null` or `undefined`.
    Null,
    /// Array literal.
    Array(Vec<Expr>),
    /// Object literal as ordered `(key, value)` pairs.
    Object(Vec<(String, Expr)>),
    /// Parenthesized expression.
    Paren(Box<Expr>),
    /// Tagged template such as `` sql`now()` ``.
    TaggedTemplate {
        /// Source text of the tag expression.
        tag: String,
        /// Raw text between the backticks.
        text: String,
    },
    /// Untagged template literal, raw text between the backticks.
    Template(String),
    /// Function or method call.
    Call {
        /// Called expression.
        callee: Box<Expr>,
        /// Positional arguments.
        args: Vec<Expr>,
    },
    /// Bare identifier.
    Ident(String),
    /// Property access `object.property`.
    Member {
        /// Accessed expression.
        object: Box<Expr>,
        /// Accessed property name.
        property: String,
    },
    /// Arrow function with an expression body.
    Arrow {
        /// Parameter source texts (destructuring patterns kept verbatim).
        params: Vec<String>,
        /// Returned expression.
        body: Box<Expr>,
    },
    /// Any other syntax, identified by its grammar kind.
    Other(String),
}

/// One call in a method chain: the called name and its arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallFrame<'a> {
    /// Identifier or accessed property that was called.
    pub name: &'a str,
    /// Arguments passed to the call.
    pub args: &'a [Expr],
}

impl<'a> CallFrame<'a> {
    /// Argument at `index`, with parentheses removed.
    pub fn arg(&self, index: usize) -> Option<&'a Expr> {
        self.args.get(index).map(Expr::unparen)
    }
}

impl Expr {
    /// Strip any number of enclosing parentheses.
    pub fn unparen(&self) -> &Expr {
        let mut current = self;
        while let Expr::Paren(inner) = current {
            current = inner;
        }
        current
    }

    /// String literal payload.
    pub fn as_str(&self) -> Option<&str> {
        match self.unparen() {
            Expr::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Numeric literal payload.
    pub fn as_number(&self) -> Option<f64> {
        match self.unparen() {
            Expr::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Boolean literal payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self.unparen() {
            Expr::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Elements of an array literal.
    pub fn as_array(&self) -> Option<&[Expr]> {
        match self.unparen() {
            Expr::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Entries of an object literal.
    pub fn as_object(&self) -> Option<&[(String, Expr)]> {
        match self.unparen() {
            Expr::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key of an object literal. The first occurrence wins.
    pub fn get(&self, key: &str) -> Option<&Expr> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value.unparen())
    }

    /// Property name of a member access (`t.email` → `email`).
    pub fn member_property(&self) -> Option<&str> {
        match self.unparen() {
            Expr::Member { property, .. } => Some(property),
            _ => None,
        }
    }

    /// Identifier a member access is rooted at (`users.id` → `users`).
    pub fn member_root(&self) -> Option<&str> {
        match self.unparen() {
            Expr::Member { object, .. } => match object.unparen() {
                Expr::Ident(name) => Some(name),
                nested @ Expr::Member { .. } => nested.member_root(),
                _ => None,
            },
            _ => None,
        }
    }

    /// Identifier name.
    pub fn as_ident(&self) -> Option<&str> {
        match self.unparen() {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Parameters and body of an arrow function.
    pub fn as_arrow(&self) -> Option<(&[String], &Expr)> {
        match self.unparen() {
            Expr::Arrow { params, body } => Some((params, body.unparen())),
            _ => None,
        }
    }
}

/// Name a call targets: the identifier, or the property of a member access.
pub fn callee_name(callee: &Expr) -> Option<&str> {
    match callee.unparen() {
        Expr::Ident(name) => Some(name),
        Expr::Member { property, .. } => Some(property),
        _ => None,
    }
}

/// Unwind a call chain into frames ordered outermost to innermost.
///
/// `uuid("id").primaryKey().defaultRandom()` yields
/// `[defaultRandom(), primaryKey(), uuid("id")]`; the last frame is the root
/// call. Unwinding stops at the first callee that is not a call on a named
/// target, so `t.varchar("x")` yields a single `varchar` frame.
pub fn call_chain(expr: &Expr) -> Vec<CallFrame<'_>> {
    let mut frames = Vec::new();
    let mut current = expr.unparen();
    while let Expr::Call { callee, args } = current {
        let callee = callee.unparen();
        let Some(name) = callee_name(callee) else {
            break;
        };
        frames.push(CallFrame { name, args });
        match callee {
            Expr::Member { object, .. } => current = object.unparen(),
            _ => break,
        }
    }
    frames
}

/// Innermost receiver of a method chain.
///
/// `t.parentId.desc().nullsLast()` yields `t.parentId`; an expression that is
/// not a method call is returned as is.
pub fn chain_receiver(expr: &Expr) -> &Expr {
    let mut current = expr.unparen();
    while let Expr::Call { callee, .. } = current {
        match callee.unparen() {
            Expr::Member { object, .. } => current = object.unparen(),
            _ => break,
        }
    }
    current
}

/// Root (innermost) call of a chain.
pub fn root_call(expr: &Expr) -> Option<CallFrame<'_>> {
    call_chain(expr).pop()
}
