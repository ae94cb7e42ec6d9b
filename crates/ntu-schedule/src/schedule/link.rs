//! Links from a course to the university course map
use url::Url;

const COURSE_MAP_URL: &str = "https://coursemap.aca.ntu.edu.tw/course_map_all/course.php";

/// Builds the course-map link for a course id such as `CSIE1212 01-1`.
///
/// The `code` parameter is the part before the space and the section token
/// up to its first dash, separated by `+`. Ids without a space have no link.
pub fn course_map_url(course_id: &str) -> Option<Url> {
    let (course, section) = course_id.split_once(' ')?;
    let section = section.split('-').next().unwrap_or(section);

    let mut url = Url::parse(COURSE_MAP_URL).ok()?;
    url.query_pairs_mut()
        .append_pair("code", &format!("{course} {section}"));
    Some(url)
}
