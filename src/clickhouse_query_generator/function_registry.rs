/// HogQL to ClickHouse function allow-list
///
/// Every function callable from HogQL is listed here with its ClickHouse name and arity
/// bounds. A name missing from this table can never reach the generated SQL.
use std::collections::HashMap;

use super::errors::ClickhouseQueryGeneratorError;

/// Inclusive argument count bounds. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl ArityBounds {
    pub const fn new(min: Option<usize>, max: Option<usize>) -> Self {
        ArityBounds { min, max }
    }

    pub const fn exactly(n: usize) -> Self {
        ArityBounds::new(Some(n), Some(n))
    }

    /// Check `found` arguments against the bounds, naming `function` in the error.
    pub fn validate(&self, function: &str, found: usize) -> Result<(), ClickhouseQueryGeneratorError> {
        let expected = match (self.min, self.max) {
            (Some(min), Some(max)) if min == max && found != min => {
                format!("exactly {}", min)
            }
            (Some(min), _) if found < min => format!("at least {}", min),
            (_, Some(max)) if found > max => format!("at most {}", max),
            _ => return Ok(()),
        };
        Err(ClickhouseQueryGeneratorError::InvalidArgumentCount {
            function: function.to_string(),
            expected,
            found,
        })
    }
}

/// Function mapping entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionMapping {
    pub hogql_name: &'static str,
    pub clickhouse_name: &'static str,
    pub arity: ArityBounds,
}

#[rustfmt::skip]
const CLICKHOUSE_FUNCTIONS: &[(&str, &str, Option<usize>, Option<usize>)] = &[
    // arithmetic
    ("plus", "plus", Some(2), Some(2)),
    ("minus", "minus", Some(2), Some(2)),
    ("multiply", "multiply", Some(2), Some(2)),
    ("divide", "divide", Some(2), Some(2)),
    ("intDiv", "intDiv", Some(2), Some(2)),
    ("intDivOrZero", "intDivOrZero", Some(2), Some(2)),
    ("modulo", "modulo", Some(2), Some(2)),
    ("moduloOrZero", "moduloOrZero", Some(2), Some(2)),
    ("positiveModulo", "positiveModulo", Some(2), Some(2)),
    ("negate", "negate", Some(1), Some(1)),
    ("abs", "abs", Some(1), Some(1)),
    ("gcd", "gcd", Some(2), Some(2)),
    ("lcm", "lcm", Some(2), Some(2)),
    ("max2", "max2", Some(2), Some(2)),
    ("min2", "min2", Some(2), Some(2)),
    ("multiplyDecimal", "multiplyDecimal", Some(2), Some(3)),
    ("divideDecimal", "divideDecimal", Some(2), Some(3)),
    // arrays and strings common
    ("empty", "empty", Some(1), Some(1)),
    ("notEmpty", "notEmpty", Some(1), Some(1)),
    ("length", "length", Some(1), Some(1)),
    ("reverse", "reverse", Some(1), Some(1)),
    // arrays
    ("array", "array", None, None),
    ("range", "range", Some(1), Some(3)),
    ("arrayConcat", "arrayConcat", Some(2), None),
    ("arrayElement", "arrayElement", Some(2), Some(2)),
    ("has", "has", Some(2), Some(2)),
    ("hasAll", "hasAll", Some(2), Some(2)),
    ("hasAny", "hasAny", Some(2), Some(2)),
    ("hasSubstr", "hasSubstr", Some(2), Some(2)),
    ("indexOf", "indexOf", Some(2), Some(2)),
    ("arrayCount", "arrayCount", Some(1), None),
    ("countEqual", "countEqual", Some(2), Some(2)),
    ("arrayEnumerate", "arrayEnumerate", Some(1), Some(1)),
    ("arrayEnumerateUniq", "arrayEnumerateUniq", Some(2), None),
    ("arrayPopBack", "arrayPopBack", Some(1), Some(1)),
    ("arrayPopFront", "arrayPopFront", Some(1), Some(1)),
    ("arrayPushBack", "arrayPushBack", Some(2), Some(2)),
    ("arrayPushFront", "arrayPushFront", Some(2), Some(2)),
    ("arrayResize", "arrayResize", Some(2), Some(3)),
    ("arraySlice", "arraySlice", Some(2), Some(3)),
    ("arraySort", "arraySort", Some(1), None),
    ("arrayReverseSort", "arraySort", Some(1), None),
    ("arrayUniq", "arrayUniq", Some(1), None),
    ("arrayJoin", "arrayJoin", Some(1), Some(1)),
    ("arrayDifference", "arrayDifference", Some(1), Some(1)),
    ("arrayDistinct", "arrayDistinct", Some(1), Some(1)),
    ("arrayEnumerateDense", "arrayEnumerateDense", Some(1), Some(1)),
    ("arrayIntersect", "arrayIntersect", Some(1), None),
    ("arrayReverse", "arrayReverse", Some(1), Some(1)),
    ("arrayFilter", "arrayFilter", Some(2), None),
    ("arrayFlatten", "arrayFlatten", Some(1), Some(1)),
    ("arrayCompact", "arrayCompact", Some(1), Some(1)),
    ("arrayZip", "arrayZip", Some(2), None),
    ("arrayAUC", "arrayAUC", Some(2), Some(2)),
    ("arrayMap", "arrayMap", Some(2), None),
    ("arrayFill", "arrayFill", Some(2), None),
    ("arraySplit", "arraySplit", Some(2), None),
    ("arrayReverseFill", "arrayReverseFill", Some(2), None),
    ("arrayReverseSplit", "arrayReverseSplit", Some(2), None),
    ("arrayExists", "arrayExists", Some(1), None),
    ("arrayAll", "arrayAll", Some(1), None),
    ("arrayFirst", "arrayFirst", Some(2), None),
    ("arrayLast", "arrayLast", Some(2), None),
    ("arrayFirstIndex", "arrayFirstIndex", Some(2), None),
    ("arrayLastIndex", "arrayLastIndex", Some(2), None),
    ("arrayMin", "arrayMin", Some(1), Some(2)),
    ("arrayMax", "arrayMax", Some(1), Some(2)),
    ("arraySum", "arraySum", Some(1), Some(2)),
    ("arrayAvg", "arrayAvg", Some(1), Some(2)),
    ("arrayCumSum", "arrayCumSum", Some(1), None),
    ("arrayCumSumNonNegative", "arrayCumSumNonNegative", Some(1), None),
    ("arrayProduct", "arrayProduct", Some(1), Some(1)),
    // comparison
    ("equals", "equals", Some(2), Some(2)),
    ("notEquals", "notEquals", Some(2), Some(2)),
    ("less", "less", Some(2), Some(2)),
    ("greater", "greater", Some(2), Some(2)),
    ("lessOrEquals", "lessOrEquals", Some(2), Some(2)),
    ("greaterOrEquals", "greaterOrEquals", Some(2), Some(2)),
    // logical
    ("and", "and", Some(2), None),
    ("or", "or", Some(2), None),
    ("xor", "xor", Some(2), None),
    ("not", "not", Some(1), Some(1)),
    // type conversions
    ("toInt", "toInt64OrNull", Some(1), Some(1)),
    ("toFloat", "toFloat64OrNull", Some(1), Some(1)),
    ("toDecimal", "toDecimal64OrNull", Some(1), Some(1)),
    ("toDate", "toDateOrNull", Some(1), Some(1)),
    ("toDateTime", "toDateTimeOrNull", Some(1), Some(1)),
    ("toUUID", "toUUIDOrNull", Some(1), Some(1)),
    ("toString", "toString", Some(1), Some(1)),
    ("toJSONString", "toJSONString", Some(1), Some(1)),
    ("parseDateTime", "parseDateTimeOrNull", Some(2), Some(2)),
    ("parseDateTimeBestEffort", "parseDateTimeBestEffortOrNull", Some(2), Some(2)),
    // dates and times
    ("toTimezone", "toTimezone", Some(2), Some(2)),
    ("timeZoneOf", "timeZoneOf", Some(1), Some(1)),
    ("timeZoneOffset", "timeZoneOffset", Some(1), Some(1)),
    ("toYear", "toYear", Some(1), Some(1)),
    ("toQuarter", "toQuarter", Some(1), Some(1)),
    ("toMonth", "toMonth", Some(1), Some(1)),
    ("toDayOfYear", "toDayOfYear", Some(1), Some(1)),
    ("toDayOfMonth", "toDayOfMonth", Some(1), Some(1)),
    ("toDayOfWeek", "toDayOfWeek", Some(1), Some(3)),
    ("toHour", "toHour", Some(1), Some(1)),
    ("toMinute", "toMinute", Some(1), Some(1)),
    ("toSecond", "toSecond", Some(1), Some(1)),
    ("toUnixTimestamp", "toUnixTimestamp", Some(1), Some(2)),
    ("toStartOfYear", "toStartOfYear", Some(1), Some(1)),
    ("toStartOfISOYear", "toStartOfISOYear", Some(1), Some(1)),
    ("toStartOfQuarter", "toStartOfQuarter", Some(1), Some(1)),
    ("toStartOfMonth", "toStartOfMonth", Some(1), Some(1)),
    ("toLastDayOfMonth", "toLastDayOfMonth", Some(1), Some(1)),
    ("toMonday", "toMonday", Some(1), Some(1)),
    ("toStartOfWeek", "toStartOfWeek", Some(1), Some(1)),
    ("toStartOfDay", "toStartOfDay", Some(1), Some(1)),
    ("toStartOfHour", "toStartOfHour", Some(1), Some(1)),
    ("toStartOfMinute", "toStartOfMinute", Some(1), Some(1)),
    ("toStartOfSecond", "toStartOfSecond", Some(1), Some(1)),
    ("toStartOfFiveMinutes", "toStartOfFiveMinutes", Some(1), Some(1)),
    ("toStartOfTenMinutes", "toStartOfTenMinutes", Some(1), Some(1)),
    ("toStartOfFifteenMinutes", "toStartOfFifteenMinutes", Some(1), Some(1)),
    ("toTime", "toTime", Some(1), Some(1)),
    ("toISOYear", "toISOYear", Some(1), Some(1)),
    ("toISOWeek", "toISOWeek", Some(1), Some(1)),
    ("toWeek", "toWeek", Some(1), Some(3)),
    ("toYearWeek", "toYearWeek", Some(1), Some(3)),
    ("age", "age", Some(3), Some(3)),
    ("dateDiff", "dateDiff", Some(3), Some(3)),
    ("dateTrunc", "dateTrunc", Some(2), Some(2)),
    ("dateAdd", "dateAdd", Some(3), Some(3)),
    ("dateSub", "dateSub", Some(3), Some(3)),
    ("timeStampAdd", "timeStampAdd", Some(2), Some(2)),
    ("timeStampSub", "timeStampSub", Some(2), Some(2)),
    ("now", "now", Some(0), Some(0)),
    ("NOW", "now", Some(0), Some(0)),
    ("now64", "now64", Some(1), Some(1)),
    ("nowInBlock", "nowInBlock", Some(1), Some(1)),
    ("today", "today", Some(0), Some(0)),
    ("yesterday", "yesterday", Some(0), Some(0)),
    ("timeSlot", "timeSlot", Some(1), Some(1)),
    ("toYYYYMM", "toYYYYMM", Some(1), Some(1)),
    ("toYYYYMMDD", "toYYYYMMDD", Some(1), Some(1)),
    ("toYYYYMMDDhhmmss", "toYYYYMMDDhhmmss", Some(1), Some(1)),
    ("addYears", "addYears", Some(2), Some(2)),
    ("addMonths", "addMonths", Some(2), Some(2)),
    ("addWeeks", "addWeeks", Some(2), Some(2)),
    ("addDays", "addDays", Some(2), Some(2)),
    ("addHours", "addHours", Some(2), Some(2)),
    ("addMinutes", "addMinutes", Some(2), Some(2)),
    ("addSeconds", "addSeconds", Some(2), Some(2)),
    ("addQuarters", "addQuarters", Some(2), Some(2)),
    ("subtractYears", "subtractYears", Some(2), Some(2)),
    ("subtractMonths", "subtractMonths", Some(2), Some(2)),
    ("subtractWeeks", "subtractWeeks", Some(2), Some(2)),
    ("subtractDays", "subtractDays", Some(2), Some(2)),
    ("subtractHours", "subtractHours", Some(2), Some(2)),
    ("subtractMinutes", "subtractMinutes", Some(2), Some(2)),
    ("subtractSeconds", "subtractSeconds", Some(2), Some(2)),
    ("subtractQuarters", "subtractQuarters", Some(2), Some(2)),
    ("timeSlots", "timeSlots", Some(2), Some(3)),
    ("formatDateTime", "formatDateTime", Some(2), Some(2)),
    ("dateName", "dateName", Some(2), Some(2)),
    ("monthName", "monthName", Some(1), Some(1)),
    ("fromUnixTimestamp", "fromUnixTimestamp", Some(1), Some(1)),
    ("toModifiedJulianDay", "toModifiedJulianDayOrNull", Some(1), Some(1)),
    ("fromModifiedJulianDay", "fromModifiedJulianDayOrNull", Some(1), Some(1)),
    ("toIntervalSecond", "toIntervalSecond", Some(1), Some(1)),
    ("toIntervalMinute", "toIntervalMinute", Some(1), Some(1)),
    ("toIntervalHour", "toIntervalHour", Some(1), Some(1)),
    ("toIntervalDay", "toIntervalDay", Some(1), Some(1)),
    ("toIntervalWeek", "toIntervalWeek", Some(1), Some(1)),
    ("toIntervalMonth", "toIntervalMonth", Some(1), Some(1)),
    ("toIntervalQuarter", "toIntervalQuarter", Some(1), Some(1)),
    ("toIntervalYear", "toIntervalYear", Some(1), Some(1)),
    // strings
    ("lengthUTF8", "lengthUTF8", Some(1), Some(1)),
    ("leftPad", "leftPad", Some(2), Some(3)),
    ("rightPad", "rightPad", Some(2), Some(3)),
    ("leftPadUTF8", "leftPadUTF8", Some(2), Some(3)),
    ("rightPadUTF8", "rightPadUTF8", Some(2), Some(3)),
    ("lower", "lower", Some(1), Some(1)),
    ("upper", "upper", Some(1), Some(1)),
    ("lowerUTF8", "lowerUTF8", Some(1), Some(1)),
    ("upperUTF8", "upperUTF8", Some(1), Some(1)),
    ("isValidUTF8", "isValidUTF8", Some(1), Some(1)),
    ("toValidUTF8", "toValidUTF8", Some(1), Some(1)),
    ("repeat", "repeat", Some(2), Some(2)),
    ("format", "format", Some(2), None),
    ("reverseUTF8", "reverseUTF8", Some(1), Some(1)),
    ("concat", "concat", Some(2), None),
    ("substring", "substring", Some(3), Some(3)),
    ("substringUTF8", "substringUTF8", Some(3), Some(3)),
    ("appendTrailingCharIfAbsent", "appendTrailingCharIfAbsent", Some(2), Some(2)),
    ("convertCharset", "convertCharset", Some(3), Some(3)),
    ("base58Encode", "base58Encode", Some(1), Some(1)),
    ("base58Decode", "base58Decode", Some(1), Some(1)),
    ("tryBase58Decode", "tryBase58Decode", Some(1), Some(1)),
    ("base64Encode", "base64Encode", Some(1), Some(1)),
    ("base64Decode", "base64Decode", Some(1), Some(1)),
    ("tryBase64Decode", "tryBase64Decode", Some(1), Some(1)),
    ("endsWith", "endsWith", Some(2), Some(2)),
    ("startsWith", "startsWith", Some(2), Some(2)),
    ("trim", "trimBoth", Some(1), Some(1)),
    ("trimLeft", "trimLeft", Some(1), Some(1)),
    ("trimRight", "trimRight", Some(1), Some(1)),
    ("encodeXMLComponent", "encodeXMLComponent", Some(1), Some(1)),
    ("decodeXMLComponent", "decodeXMLComponent", Some(1), Some(1)),
    ("extractTextFromHTML", "extractTextFromHTML", Some(1), Some(1)),
    ("ascii", "ascii", Some(1), Some(1)),
    ("concatWithSeparator", "concatWithSeparator", Some(2), None),
    // searching in strings
    ("position", "position", Some(2), Some(3)),
    ("positionCaseInsensitive", "positionCaseInsensitive", Some(2), Some(3)),
    ("positionUTF8", "positionUTF8", Some(2), Some(3)),
    ("positionCaseInsensitiveUTF8", "positionCaseInsensitiveUTF8", Some(2), Some(3)),
    ("multiSearchAllPositions", "multiSearchAllPositions", Some(2), Some(2)),
    ("multiSearchAllPositionsUTF8", "multiSearchAllPositionsUTF8", Some(2), Some(2)),
    ("multiSearchFirstPosition", "multiSearchFirstPosition", Some(2), Some(2)),
    ("multiSearchFirstIndex", "multiSearchFirstIndex", Some(2), Some(2)),
    ("multiSearchAny", "multiSearchAny", Some(2), Some(2)),
    ("match", "match", Some(2), Some(2)),
    ("multiMatchAny", "multiMatchAny", Some(2), Some(2)),
    ("multiMatchAnyIndex", "multiMatchAnyIndex", Some(2), Some(2)),
    ("multiMatchAllIndices", "multiMatchAllIndices", Some(2), Some(2)),
    ("multiFuzzyMatchAny", "multiFuzzyMatchAny", Some(3), Some(3)),
    ("multiFuzzyMatchAnyIndex", "multiFuzzyMatchAnyIndex", Some(3), Some(3)),
    ("multiFuzzyMatchAllIndices", "multiFuzzyMatchAllIndices", Some(3), Some(3)),
    ("extract", "extract", Some(2), Some(2)),
    ("extractAll", "extractAll", Some(2), Some(2)),
    ("extractAllGroupsHorizontal", "extractAllGroupsHorizontal", Some(2), Some(2)),
    ("extractAllGroupsVertical", "extractAllGroupsVertical", Some(2), Some(2)),
    ("like", "like", Some(2), Some(2)),
    ("ilike", "ilike", Some(2), Some(2)),
    ("notLike", "notLike", Some(2), Some(2)),
    ("notILike", "notILike", Some(2), Some(2)),
    ("ngramDistance", "ngramDistance", Some(2), Some(2)),
    ("ngramSearch", "ngramSearch", Some(2), Some(2)),
    ("countSubstrings", "countSubstrings", Some(2), Some(3)),
    ("countSubstringsCaseInsensitive", "countSubstringsCaseInsensitive", Some(2), Some(3)),
    ("countSubstringsCaseInsensitiveUTF8", "countSubstringsCaseInsensitiveUTF8", Some(2), Some(3)),
    ("countMatches", "countMatches", Some(2), Some(2)),
    ("regexpExtract", "regexpExtract", Some(2), Some(3)),
    // replacing in strings
    ("replace", "replace", Some(3), Some(3)),
    ("replaceAll", "replaceAll", Some(3), Some(3)),
    ("replaceOne", "replaceOne", Some(3), Some(3)),
    ("replaceRegexpAll", "replaceRegexpAll", Some(3), Some(3)),
    ("replaceRegexpOne", "replaceRegexpOne", Some(3), Some(3)),
    ("regexpQuoteMeta", "regexpQuoteMeta", Some(1), Some(1)),
    ("translate", "translate", Some(3), Some(3)),
    ("translateUTF8", "translateUTF8", Some(3), Some(3)),
    // conditional
    ("if", "if", Some(3), Some(3)),
    ("multiIf", "multiIf", Some(3), None),
    // mathematical
    ("e", "e", Some(0), Some(0)),
    ("pi", "pi", Some(0), Some(0)),
    ("exp", "exp", Some(1), Some(1)),
    ("log", "log", Some(1), Some(1)),
    ("ln", "ln", Some(1), Some(1)),
    ("exp2", "exp2", Some(1), Some(1)),
    ("log2", "log2", Some(1), Some(1)),
    ("exp10", "exp10", Some(1), Some(1)),
    ("log10", "log10", Some(1), Some(1)),
    ("sqrt", "sqrt", Some(1), Some(1)),
    ("cbrt", "cbrt", Some(1), Some(1)),
    ("erf", "erf", Some(1), Some(1)),
    ("erfc", "erfc", Some(1), Some(1)),
    ("lgamma", "lgamma", Some(1), Some(1)),
    ("tgamma", "tgamma", Some(1), Some(1)),
    ("sin", "sin", Some(1), Some(1)),
    ("cos", "cos", Some(1), Some(1)),
    ("tan", "tan", Some(1), Some(1)),
    ("asin", "asin", Some(1), Some(1)),
    ("acos", "acos", Some(1), Some(1)),
    ("atan", "atan", Some(1), Some(1)),
    ("pow", "pow", Some(2), Some(2)),
    ("power", "power", Some(2), Some(2)),
    ("intExp2", "intExp2", Some(1), Some(1)),
    ("intExp10", "intExp10", Some(1), Some(1)),
    ("cosh", "cosh", Some(1), Some(1)),
    ("acosh", "acosh", Some(1), Some(1)),
    ("sinh", "sinh", Some(1), Some(1)),
    ("asinh", "asinh", Some(1), Some(1)),
    ("atanh", "atanh", Some(1), Some(1)),
    ("atan2", "atan2", Some(2), Some(2)),
    ("hypot", "hypot", Some(2), Some(2)),
    ("log1p", "log1p", Some(1), Some(1)),
    ("sign", "sign", Some(1), Some(1)),
    ("degrees", "degrees", Some(1), Some(1)),
    ("radians", "radians", Some(1), Some(1)),
    ("factorial", "factorial", Some(1), Some(1)),
    ("width_bucket", "width_bucket", Some(4), Some(4)),
    // rounding
    ("floor", "floor", Some(1), Some(2)),
    ("ceil", "ceil", Some(1), Some(2)),
    ("trunc", "trunc", Some(1), Some(2)),
    ("round", "round", Some(1), Some(2)),
    ("roundBankers", "roundBankers", Some(1), Some(2)),
    ("roundToExp2", "roundToExp2", Some(1), Some(1)),
    ("roundDuration", "roundDuration", Some(1), Some(1)),
    ("roundAge", "roundAge", Some(1), Some(1)),
    ("roundDown", "roundDown", Some(2), Some(2)),
    // maps
    ("map", "map", Some(2), None),
    ("mapFromArrays", "mapFromArrays", Some(2), Some(2)),
    ("mapAdd", "mapAdd", Some(2), None),
    ("mapSubtract", "mapSubtract", Some(2), None),
    ("mapPopulateSeries", "mapPopulateSeries", Some(1), Some(3)),
    ("mapContains", "mapContains", Some(2), Some(2)),
    ("mapKeys", "mapKeys", Some(1), Some(1)),
    ("mapValues", "mapValues", Some(1), Some(1)),
    ("mapContainsKeyLike", "mapContainsKeyLike", Some(2), Some(2)),
    ("mapExtractKeyLike", "mapExtractKeyLike", Some(2), Some(2)),
    ("mapApply", "mapApply", Some(2), Some(2)),
    ("mapFilter", "mapFilter", Some(2), Some(2)),
    ("mapUpdate", "mapUpdate", Some(2), Some(2)),
    // splitting strings
    ("splitByChar", "splitByChar", Some(3), Some(3)),
    ("splitByString", "splitByString", Some(3), Some(3)),
    ("splitByRegexp", "splitByRegexp", Some(3), Some(3)),
    ("splitByWhitespace", "splitByWhitespace", Some(2), Some(2)),
    ("splitByNonAlpha", "splitByNonAlpha", Some(2), Some(2)),
    ("arrayStringConcat", "arrayStringConcat", Some(1), Some(2)),
    ("alphaTokens", "alphaTokens", Some(2), Some(2)),
    ("extractAllGroups", "extractAllGroups", Some(2), Some(2)),
    ("ngrams", "ngrams", Some(2), Some(2)),
    ("tokens", "tokens", Some(1), Some(1)),
    // bit
    ("bitAnd", "bitAnd", Some(2), Some(2)),
    ("bitOr", "bitOr", Some(2), Some(2)),
    ("bitXor", "bitXor", Some(2), Some(2)),
    ("bitNot", "bitNot", Some(1), Some(1)),
    ("bitShiftLeft", "bitShiftLeft", Some(2), Some(2)),
    ("bitShiftRight", "bitShiftRight", Some(2), Some(2)),
    ("bitRotateLeft", "bitRotateLeft", Some(2), Some(2)),
    ("bitRotateRight", "bitRotateRight", Some(2), Some(2)),
    ("bitSlice", "bitSlice", Some(3), Some(3)),
    ("bitTest", "bitTest", Some(2), Some(2)),
    ("bitTestAll", "bitTestAll", Some(3), None),
    ("bitTestAny", "bitTestAny", Some(3), None),
    ("bitCount", "bitCount", Some(1), Some(1)),
    ("bitHammingDistance", "bitHammingDistance", Some(2), Some(2)),
    // bitmap
    ("bitmapBuild", "bitmapBuild", Some(1), Some(1)),
    ("bitmapToArray", "bitmapToArray", Some(1), Some(1)),
    ("bitmapSubsetInRange", "bitmapSubsetInRange", Some(3), Some(3)),
    ("bitmapSubsetLimit", "bitmapSubsetLimit", Some(3), Some(3)),
    ("subBitmap", "subBitmap", Some(3), Some(3)),
    ("bitmapContains", "bitmapContains", Some(2), Some(2)),
    ("bitmapHasAny", "bitmapHasAny", Some(2), Some(2)),
    ("bitmapHasAll", "bitmapHasAll", Some(2), Some(2)),
    ("bitmapCardinality", "bitmapCardinality", Some(1), Some(1)),
    ("bitmapMin", "bitmapMin", Some(1), Some(1)),
    ("bitmapMax", "bitmapMax", Some(1), Some(1)),
    ("bitmapTransform", "bitmapTransform", Some(3), Some(3)),
    ("bitmapAnd", "bitmapAnd", Some(2), Some(2)),
    ("bitmapOr", "bitmapOr", Some(2), Some(2)),
    ("bitmapXor", "bitmapXor", Some(2), Some(2)),
    ("bitmapAndnot", "bitmapAndnot", Some(2), Some(2)),
    ("bitmapAndCardinality", "bitmapAndCardinality", Some(2), Some(2)),
    ("bitmapOrCardinality", "bitmapOrCardinality", Some(2), Some(2)),
    ("bitmapXorCardinality", "bitmapXorCardinality", Some(2), Some(2)),
    ("bitmapAndnotCardinality", "bitmapAndnotCardinality", Some(2), Some(2)),
    // urls
    ("protocol", "protocol", Some(1), Some(1)),
    ("domain", "domain", Some(1), Some(1)),
    ("domainWithoutWWW", "domainWithoutWWW", Some(1), Some(1)),
    ("topLevelDomain", "topLevelDomain", Some(1), Some(1)),
    ("firstSignificantSubdomain", "firstSignificantSubdomain", Some(1), Some(1)),
    ("cutToFirstSignificantSubdomain", "cutToFirstSignificantSubdomain", Some(1), Some(1)),
    ("cutToFirstSignificantSubdomainWithWWW", "cutToFirstSignificantSubdomainWithWWW", Some(1), Some(1)),
    ("port", "port", Some(1), Some(2)),
    ("path", "path", Some(1), Some(1)),
    ("pathFull", "pathFull", Some(1), Some(1)),
    ("queryString", "queryString", Some(1), Some(1)),
    ("fragment", "fragment", Some(1), Some(1)),
    ("queryStringAndFragment", "queryStringAndFragment", Some(1), Some(1)),
    ("extractURLParameter", "extractURLParameter", Some(2), Some(2)),
    ("extractURLParameters", "extractURLParameters", Some(1), Some(1)),
    ("extractURLParameterNames", "extractURLParameterNames", Some(1), Some(1)),
    ("URLHierarchy", "URLHierarchy", Some(1), Some(1)),
    ("URLPathHierarchy", "URLPathHierarchy", Some(1), Some(1)),
    ("encodeURLComponent", "encodeURLComponent", Some(1), Some(1)),
    ("decodeURLComponent", "decodeURLComponent", Some(1), Some(1)),
    ("encodeURLFormComponent", "encodeURLFormComponent", Some(1), Some(1)),
    ("decodeURLFormComponent", "decodeURLFormComponent", Some(1), Some(1)),
    ("netloc", "netloc", Some(1), Some(1)),
    ("cutWWW", "cutWWW", Some(1), Some(1)),
    ("cutQueryString", "cutQueryString", Some(1), Some(1)),
    ("cutFragment", "cutFragment", Some(1), Some(1)),
    ("cutQueryStringAndFragment", "cutQueryStringAndFragment", Some(1), Some(1)),
    ("cutURLParameter", "cutURLParameter", Some(2), Some(2)),
    // json
    ("isValidJSON", "isValidJSON", Some(1), Some(1)),
    ("JSONHas", "JSONHas", Some(1), None),
    ("JSONLength", "JSONLength", Some(1), None),
    ("JSONArrayLength", "JSONArrayLength", Some(1), None),
    ("JSONType", "JSONType", Some(1), None),
    ("JSONExtractUInt", "JSONExtractUInt", Some(1), None),
    ("JSONExtractInt", "JSONExtractInt", Some(1), None),
    ("JSONExtractFloat", "JSONExtractFloat", Some(1), None),
    ("JSONExtractBool", "JSONExtractBool", Some(1), None),
    ("JSONExtractString", "JSONExtractString", Some(1), None),
    ("JSONExtractKey", "JSONExtractKey", Some(1), None),
    ("JSONExtractKeys", "JSONExtractKeys", Some(1), None),
    ("JSONExtractRaw", "JSONExtractRaw", Some(1), None),
    ("JSONExtractArrayRaw", "JSONExtractArrayRaw", Some(1), None),
    ("JSONExtractKeysAndValuesRaw", "JSONExtractKeysAndValuesRaw", Some(1), None),
    // in
    ("in", "in", Some(2), Some(2)),
    ("notIn", "notIn", Some(2), Some(2)),
    // geo
    ("greatCircleDistance", "greatCircleDistance", Some(4), Some(4)),
    ("geoDistance", "geoDistance", Some(4), Some(4)),
    ("greatCircleAngle", "greatCircleAngle", Some(4), Some(4)),
    ("pointInEllipses", "pointInEllipses", Some(6), None),
    ("pointInPolygon", "pointInPolygon", Some(2), None),
    // nullable
    ("isNull", "isNull", Some(1), Some(1)),
    ("isNotNull", "isNotNull", Some(1), Some(1)),
    ("coalesce", "coalesce", Some(1), None),
    ("ifNull", "ifNull", Some(2), Some(2)),
    ("nullIf", "nullIf", Some(2), Some(2)),
    ("assumeNotNull", "assumeNotNull", Some(1), Some(1)),
    ("toNullable", "toNullable", Some(1), Some(1)),
    // tuples
    ("tuple", "tuple", None, None),
    ("tupleElement", "tupleElement", Some(2), Some(3)),
    ("untuple", "untuple", Some(1), Some(1)),
    ("tupleHammingDistance", "tupleHammingDistance", Some(2), Some(2)),
    ("tupleToNameValuePairs", "tupleToNameValuePairs", Some(1), Some(1)),
    ("tuplePlus", "tuplePlus", Some(2), Some(2)),
    ("tupleMinus", "tupleMinus", Some(2), Some(2)),
    ("tupleMultiply", "tupleMultiply", Some(2), Some(2)),
    ("tupleDivide", "tupleDivide", Some(2), Some(2)),
    ("tupleNegate", "tupleNegate", Some(1), Some(1)),
    ("tupleMultiplyByNumber", "tupleMultiplyByNumber", Some(2), Some(2)),
    ("tupleDivideByNumber", "tupleDivideByNumber", Some(2), Some(2)),
    ("dotProduct", "dotProduct", Some(2), Some(2)),
    // other
    ("isFinite", "isFinite", Some(1), Some(1)),
    ("isInfinite", "isInfinite", Some(1), Some(1)),
    ("ifNotFinite", "ifNotFinite", Some(1), Some(1)),
    ("isNaN", "isNaN", Some(1), Some(1)),
    ("bar", "bar", Some(4), Some(4)),
    ("transform", "transform", Some(3), Some(4)),
    ("formatReadableDecimalSize", "formatReadableDecimalSize", Some(1), Some(1)),
    ("formatReadableSize", "formatReadableSize", Some(1), Some(1)),
    ("formatReadableQuantity", "formatReadableQuantity", Some(1), Some(1)),
    ("formatReadableTimeDelta", "formatReadableTimeDelta", Some(1), Some(2)),
    // time window
    ("tumble", "tumble", Some(2), Some(2)),
    ("hop", "hop", Some(3), Some(3)),
    ("tumbleStart", "tumbleStart", Some(1), Some(3)),
    ("tumbleEnd", "tumbleEnd", Some(1), Some(3)),
    ("hopStart", "hopStart", Some(1), Some(3)),
    ("hopEnd", "hopEnd", Some(1), Some(3)),
    // distance window
    ("L1Norm", "L1Norm", Some(1), Some(1)),
    ("L2Norm", "L2Norm", Some(1), Some(1)),
    ("LinfNorm", "LinfNorm", Some(1), Some(1)),
    ("LpNorm", "LpNorm", Some(2), Some(2)),
    ("L1Distance", "L1Distance", Some(2), Some(2)),
    ("L2Distance", "L2Distance", Some(2), Some(2)),
    ("LinfDistance", "LinfDistance", Some(2), Some(2)),
    ("LpDistance", "LpDistance", Some(3), Some(3)),
    ("L1Normalize", "L1Normalize", Some(1), Some(1)),
    ("L2Normalize", "L2Normalize", Some(1), Some(1)),
    ("LinfNormalize", "LinfNormalize", Some(1), Some(1)),
    ("LpNormalize", "LpNormalize", Some(2), Some(2)),
    ("cosineDistance", "cosineDistance", Some(2), Some(2)),
];

const HOGQL_AGGREGATIONS: &[(&str, ArityBounds)] = &[
    ("count", ArityBounds::new(Some(0), Some(1))),
    ("countIf", ArityBounds::new(Some(1), Some(2))),
    ("min", ArityBounds::exactly(1)),
    ("minIf", ArityBounds::exactly(2)),
    ("max", ArityBounds::exactly(1)),
    ("maxIf", ArityBounds::exactly(2)),
    ("sum", ArityBounds::exactly(1)),
    ("sumIf", ArityBounds::exactly(2)),
    ("avg", ArityBounds::exactly(1)),
    ("avgIf", ArityBounds::exactly(2)),
    ("any", ArityBounds::exactly(1)),
    ("anyIf", ArityBounds::exactly(2)),
    ("argMax", ArityBounds::exactly(2)),
    ("argMin", ArityBounds::exactly(2)),
    // shorthand for count(*)
    ("total", ArityBounds::exactly(0)),
];

/// Functions that get the query timezone appended as a trailing argument.
const ADD_TIMEZONE_TO_FUNCTIONS: &[&str] = &["now", "now64", "NOW", "toDateTime"];

/// Keywords passed to ClickHouse without transformation
pub const KEYWORDS: &[&str] = &["true", "false", "null"];

/// Names that can't be used as an alias
const RESERVED_KEYWORDS: &[&str] = &["true", "false", "null", "team_id"];

lazy_static::lazy_static! {
    static ref FUNCTION_MAPPINGS: HashMap<&'static str, FunctionMapping> = CLICKHOUSE_FUNCTIONS
        .iter()
        .map(|&(hogql_name, clickhouse_name, min, max)| {
            (
                hogql_name,
                FunctionMapping {
                    hogql_name,
                    clickhouse_name,
                    arity: ArityBounds::new(min, max),
                },
            )
        })
        .collect();

    static ref AGGREGATIONS: HashMap<&'static str, ArityBounds> =
        HOGQL_AGGREGATIONS.iter().copied().collect();
}

/// Look up a plain (non-aggregate) function. Names are case-sensitive.
pub fn resolve_function(name: &str) -> Option<FunctionMapping> {
    FUNCTION_MAPPINGS.get(name).copied()
}

/// Look up an aggregate function's arity bounds.
pub fn resolve_aggregation(name: &str) -> Option<ArityBounds> {
    AGGREGATIONS.get(name).copied()
}

pub fn is_aggregation(name: &str) -> bool {
    AGGREGATIONS.contains_key(name)
}

pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

pub fn is_reserved_keyword(name: &str) -> bool {
    RESERVED_KEYWORDS.contains(&name)
}

pub fn adds_timezone(name: &str) -> bool {
    ADD_TIMEZONE_TO_FUNCTIONS.contains(&name)
}
